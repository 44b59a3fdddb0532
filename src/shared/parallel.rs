//! Worker-pool sizing for the fork-join stage fan-out (§5). One workload
//! shape (node/edge count of a single investigation's graph), so no
//! profiling step is needed — just a core-count-aware cap that avoids
//! over-parallelizing small graphs.

use std::sync::OnceLock;

static GLOBAL_POOL: OnceLock<rayon::ThreadPool> = OnceLock::new();

/// Number of workers to use for a workload of `item_count` independent
/// units (nodes, anchors, candidate addresses, ...).
///
/// Small workloads get fewer workers than `num_cpus` so thread spin-up
/// doesn't dominate; large workloads are capped at the available cores.
pub fn workers_for(item_count: usize) -> usize {
    let cores = num_cpus::get().max(1);
    if item_count < 64 {
        1
    } else {
        cores.min(item_count / 32 + 1)
    }
}

/// Process-wide rayon pool, sized once at first use.
pub fn global_pool() -> &'static rayon::ThreadPool {
    GLOBAL_POOL.get_or_init(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get().max(1))
            .thread_name(|i| format!("chainwitness-worker-{i}"))
            .build()
            .expect("failed to build chainwitness worker pool")
    })
}
