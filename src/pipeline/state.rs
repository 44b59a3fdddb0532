//! §4.10 investigation lifecycle state machine.

use serde::{Deserialize, Serialize};

/// One investigation's position in the §4.10 lifecycle. `Failed` is
/// terminal; every other state can always advance to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum InvestigationState {
    Created,
    DataFetched,
    GraphBuilt,
    Analysed,
    Scored,
    Reported,
    CachedResultReuse,
    Failed { stage: &'static str, error: String },
}

impl InvestigationState {
    fn ordinal(&self) -> u8 {
        match self {
            InvestigationState::Created => 0,
            InvestigationState::DataFetched => 1,
            InvestigationState::GraphBuilt => 2,
            InvestigationState::Analysed => 3,
            InvestigationState::Scored => 4,
            InvestigationState::Reported => 5,
            InvestigationState::CachedResultReuse => 5,
            InvestigationState::Failed { .. } => u8::MAX,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvestigationState::Reported | InvestigationState::CachedResultReuse | InvestigationState::Failed { .. })
    }
}

/// Tracks one investigation's state and the ordered history of
/// transitions it took to get there.
#[derive(Debug, Clone)]
pub struct InvestigationLifecycle {
    current: InvestigationState,
    history: Vec<InvestigationState>,
}

impl InvestigationLifecycle {
    pub fn new() -> Self {
        Self { current: InvestigationState::Created, history: vec![InvestigationState::Created] }
    }

    pub fn current(&self) -> &InvestigationState {
        &self.current
    }

    pub fn history(&self) -> &[InvestigationState] {
        &self.history
    }

    /// Advances to `next`. Any state may move to `Failed`; otherwise the
    /// target must be strictly later in the lifecycle than the current
    /// state, since stages never re-run after completing.
    pub fn advance(&mut self, next: InvestigationState) {
        if matches!(self.current, InvestigationState::Failed { .. }) {
            return;
        }
        if !matches!(next, InvestigationState::Failed { .. }) && next.ordinal() <= self.current.ordinal() {
            return;
        }
        self.current = next.clone();
        self.history.push(next);
    }

    pub fn fail(&mut self, stage: &'static str, error: impl Into<String>) {
        self.advance(InvestigationState::Failed { stage, error: error.into() });
    }
}

impl Default for InvestigationLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_lifecycle_starts_at_created() {
        let lifecycle = InvestigationLifecycle::new();
        assert_eq!(*lifecycle.current(), InvestigationState::Created);
    }

    #[test]
    fn failed_is_terminal_and_absorbs_further_transitions() {
        let mut lifecycle = InvestigationLifecycle::new();
        lifecycle.fail("graphBuilt", "boom");
        lifecycle.advance(InvestigationState::Scored);
        assert!(matches!(lifecycle.current(), InvestigationState::Failed { .. }));
    }

    #[test]
    fn cannot_go_backwards() {
        let mut lifecycle = InvestigationLifecycle::new();
        lifecycle.advance(InvestigationState::GraphBuilt);
        lifecycle.advance(InvestigationState::DataFetched);
        assert_eq!(*lifecycle.current(), InvestigationState::GraphBuilt);
    }

    #[test]
    fn reported_and_cached_result_reuse_are_both_terminal() {
        assert!(InvestigationState::Reported.is_terminal());
        assert!(InvestigationState::CachedResultReuse.is_terminal());
        assert!(!InvestigationState::Analysed.is_terminal());
    }
}
