//! CLI surface (§6): `chainwitness analyze <address> [--profile P]
//! [--depth N] [--include-ai] [--max-transactions N]`.
//!
//! The chain RPC client is an external collaborator (§1); this binary
//! drives it against a captured fixture file rather than a live
//! endpoint, so the pipeline can be exercised end-to-end without
//! depending on any particular chain's RPC surface.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chainwitness::config::{InvestigationType, Preset, PipelineConfig};
use chainwitness::errors::ChainwitnessError;
use chainwitness::shared::models::{Address, IntegrationCatalogData, ServiceType, TaintSeed, TxSignature};
use chainwitness::shared::ports::{ChainClient, SignatureInfo, TransactionDetails};
use chainwitness::{analyze, InvestigationState};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum InvestigationTypeArg {
    VictimRecovery,
    FinancialCrime,
    Routine,
}

impl From<InvestigationTypeArg> for InvestigationType {
    fn from(value: InvestigationTypeArg) -> Self {
        match value {
            InvestigationTypeArg::VictimRecovery => InvestigationType::VictimRecovery,
            InvestigationTypeArg::FinancialCrime => InvestigationType::FinancialCrime,
            InvestigationTypeArg::Routine => InvestigationType::Routine,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chainwitness", about = "Wallet-investigation engine")]
struct Cli {
    /// Address to investigate.
    address: String,

    /// Named risk-scoring profile; when omitted, one is recommended from
    /// the fixture and catalog contents (§4.9 recommender).
    #[arg(long)]
    profile: Option<String>,

    /// What the investigation is chasing, used by the recommender when
    /// `--profile` is omitted; defaults to `routine`.
    #[arg(long, value_enum)]
    investigation_type: Option<InvestigationTypeArg>,

    /// Overrides the taint propagation max-hop depth.
    #[arg(long)]
    depth: Option<u32>,

    /// Reserved for AI-assisted narrative framing (§6); currently a no-op
    /// since no concrete AI adapter is wired into this binary.
    #[arg(long)]
    include_ai: bool,

    /// Caps the number of transactions pulled per investigation.
    #[arg(long, default_value_t = 500)]
    max_transactions: usize,

    /// Captured chain data to investigate: a JSON document with
    /// `signatures`, `transactions`, and optional `seeds`.
    #[arg(long)]
    input: PathBuf,

    /// Integration catalog JSON file; omit for an empty catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Config override file (YAML or JSON), deep-merged over the
    /// selected profile's defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overall investigation deadline, in seconds.
    #[arg(long, default_value_t = 30)]
    deadline_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    signatures: Vec<SignatureInfo>,
    transactions: HashMap<TxSignature, TransactionDetails>,
    #[serde(default)]
    seeds: Vec<TaintSeed>,
}

struct FixtureChainClient {
    fixture: Fixture,
}

#[async_trait]
impl ChainClient for FixtureChainClient {
    async fn get_signatures_for(&self, _address: &Address, limit: usize) -> Result<Vec<SignatureInfo>, String> {
        Ok(self.fixture.signatures.iter().take(limit).cloned().collect())
    }

    async fn get_transaction_details(&self, signature: &TxSignature) -> Result<TransactionDetails, String> {
        self.fixture
            .transactions
            .get(signature)
            .cloned()
            .ok_or_else(|| format!("no fixture transaction recorded for {signature}"))
    }
}

fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
}

fn load_config(cli: &Cli, preset: Preset) -> Result<PipelineConfig, ChainwitnessError> {
    let mut config = match &cli.config {
        Some(path) => chainwitness::config::io::load_patched(path, preset)?,
        None => PipelineConfig::from_preset(preset),
    };
    if let Some(depth) = cli.depth {
        config.taint.max_hops = depth;
    }
    Ok(config)
}

fn load_catalog(path: Option<&PathBuf>) -> Result<IntegrationCatalogData, ChainwitnessError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(IntegrationCatalogData {
            version: "empty".to_string(),
            last_updated: chrono::Utc::now(),
            services: vec![],
            sources: vec![],
        }),
    }
}

async fn run(cli: Cli) -> Result<ExitCode, ChainwitnessError> {
    if cli.address.trim().is_empty() {
        return Err(ChainwitnessError::invalid_input("address must not be empty"));
    }
    if cli.max_transactions == 0 {
        return Err(ChainwitnessError::invalid_input("max-transactions must be positive"));
    }

    let catalog = load_catalog(cli.catalog.as_ref())?;

    if cli.include_ai {
        tracing::info!("--include-ai requested but no AI adapter is configured for this binary; continuing without it");
    }

    let text = std::fs::read_to_string(&cli.input)?;
    let fixture: Fixture = serde_json::from_str(&text)?;
    let seeds = fixture.seeds.clone();

    let preset = match &cli.profile {
        Some(name) => Preset::parse(name)?,
        None => {
            let has_incident = !seeds.is_empty();
            let has_cex_interactions = catalog.services.iter().any(|s| s.r#type == ServiceType::Cex);
            let max_value = fixture
                .transactions
                .values()
                .flat_map(|tx| tx.edges.iter())
                .map(|edge| edge.value)
                .fold(0.0f64, f64::max);
            let transaction_count = fixture.transactions.len();
            let investigation_type = cli.investigation_type.map(InvestigationType::from).unwrap_or(InvestigationType::Routine);
            chainwitness::config::recommend_preset(
                has_incident,
                has_cex_interactions,
                max_value,
                transaction_count,
                investigation_type,
            )
        }
    };
    let config = load_config(&cli, preset)?;
    let client = FixtureChainClient { fixture };

    let target = Address::from(cli.address.as_str());
    let deadline = Instant::now() + Duration::from_secs(cli.deadline_seconds);

    let (report, lifecycle) = analyze(&client, &target, &seeds, &catalog, &config, cli.max_transactions, None, deadline).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(match lifecycle.current() {
        InvestigationState::Failed { .. } => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err @ ChainwitnessError::InvalidInput(_)) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
        Err(err @ ChainwitnessError::DataUnavailable(_)) => {
            eprintln!("{err}");
            ExitCode::from(3)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}
