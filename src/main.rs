//! growmonitor - grow-room climate telemetry CLI
//!
//! # Usage
//!
//! ```bash
//! # Live status for a device (needs device-cloud credentials)
//! growmonitor status --device bf1234
//!
//! # Weekly report from an offline dump, including merged points
//! ./simulation --hours 168 > dump.json
//! growmonitor report --device bf1234 --range 7d --input dump.json --points
//!
//! # Ask for a recommendation (one per user per cooldown window)
//! growmonitor recommend --user alice --device bf1234
//! ```
//!
//! # Environment Variables
//!
//! - `GROWMONITOR_CONFIG`: Path to the TOML config file
//! - `GROWMONITOR_CLIENT_ID` / `GROWMONITOR_ACCESS_TOKEN`: Device-cloud credentials
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use growmonitor::acquisition::{CloudClient, DeviceCloud, FileSource, ValueScaling};
use growmonitor::config::MonitorConfig;
use growmonitor::pipeline::{ReportRequest, TelemetryCoordinator};
use growmonitor::recommendation::{CooldownGate, HttpGenerator, RecommendationService};
use growmonitor::storage::SledStore;
use growmonitor::types::{
    format_remaining, GateState, RangePreset, RecommendationContext, RecommendationOutcome,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "growmonitor")]
#[command(about = "Grow-room telemetry aggregation and climate metrics")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides GROWMONITOR_CONFIG and ./growmonitor.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Current reading, derived climate and the last-day window
    Status {
        #[arg(long)]
        device: String,
        /// Read logs from a JSON dump instead of the device cloud
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Window summaries over a preset range
    Report {
        #[arg(long)]
        device: String,
        /// 1d, 3d, 7d, 30d, 90d or 365d
        #[arg(long, default_value = "1d")]
        range: RangePreset,
        /// Comma-separated metric codes (default: temperature and humidity)
        #[arg(long, value_delimiter = ',')]
        codes: Vec<String>,
        #[arg(long)]
        input: Option<PathBuf>,
        /// Include merged points with VPD and dew point
        #[arg(long)]
        points: bool,
    },

    /// Request climate advice, subject to the per-user cooldown
    Recommend {
        #[arg(long)]
        user: String,
        #[arg(long)]
        device: String,
        /// Free-text note passed to the generator
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show a user's cooldown state
    Cooldown {
        #[arg(long)]
        user: String,
    },

    /// Show a user's past recommendations, newest first
    History {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

// ============================================================================
// Wiring
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let mut config = match path {
        Some(p) => MonitorConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display()))?,
        None => MonitorConfig::load(),
    };
    if path.is_some() {
        config.apply_env_overrides();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn device_cloud(config: &MonitorConfig, input: Option<&Path>) -> Result<Arc<dyn DeviceCloud>> {
    let scaling = ValueScaling::new(config.telemetry.divisors.clone());
    match input {
        Some(path) => {
            let source = FileSource::open(path, scaling)
                .with_context(|| format!("Failed to read log dump {}", path.display()))?;
            Ok(Arc::new(source))
        }
        None => {
            if !config.device_cloud.has_credentials() {
                warn!("Device-cloud credentials are not set; requests will likely be rejected");
            }
            let client = CloudClient::new(&config.device_cloud, scaling)
                .context("Failed to build device-cloud client")?;
            info!(base_url = client.base_url(), "Using device cloud");
            Ok(Arc::new(client))
        }
    }
}

fn open_store(config: &MonitorConfig) -> Result<Arc<SledStore>> {
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.storage.data_dir.display()
        )
    })?;
    let path = config.database_path();
    let store = SledStore::open(&path)
        .with_context(|| format!("Failed to open store at {}", path.display()))?;
    Ok(Arc::new(store))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn gate_json(state: &GateState) -> serde_json::Value {
    match state {
        GateState::Available => serde_json::json!({ "status": "available" }),
        GateState::CoolingDown { until, remaining } => serde_json::json!({
            "status": "cooling_down",
            "until": growmonitor::types::format_timestamp(*until),
            "remaining": format_remaining(*remaining),
        }),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Status { device, input } => {
            let cloud = device_cloud(&config, input.as_deref())?;
            let coordinator = TelemetryCoordinator::new(cloud, config.telemetry.clone());
            let snapshot = coordinator
                .status(&device, Utc::now().timestamp_millis())
                .await
                .context("Status request failed")?;
            print_json(&snapshot)?;
        }

        SubCommand::Report {
            device,
            range,
            codes,
            input,
            points,
        } => {
            let cloud = device_cloud(&config, input.as_deref())?;
            let coordinator = TelemetryCoordinator::new(cloud, config.telemetry.clone());
            let request = ReportRequest {
                device_id: device,
                codes,
                range: range.ending_at(Utc::now().timestamp_millis()),
                include_points: points,
            };
            let report = coordinator
                .report(&request)
                .await
                .context("Report request failed")?;
            print_json(&report)?;
        }

        SubCommand::Recommend {
            user,
            device,
            note,
            input,
        } => {
            let Some(url) = config.recommendation.generator_url.clone() else {
                bail!("recommendation.generator_url is not configured");
            };
            let store = open_store(&config)?;
            let generator = HttpGenerator::new(url, config.recommendation.generator_timeout())
                .context("Failed to build generator client")?;
            let service = RecommendationService::new(
                CooldownGate::from_config(&config.recommendation),
                store.clone(),
                store,
                Arc::new(generator),
            );

            // Skip the telemetry round trip when the gate is closed anyway
            let state = service.state(&user, Utc::now())?;
            if !state.is_available() {
                print_json(&gate_json(&state))?;
                return Ok(());
            }

            let cloud = device_cloud(&config, input.as_deref())?;
            let coordinator = TelemetryCoordinator::new(cloud, config.telemetry.clone());
            let snapshot = coordinator
                .status(&device, Utc::now().timestamp_millis())
                .await
                .context("Status request failed")?;

            let context = RecommendationContext {
                user_id: user,
                snapshot,
                note,
            };
            match service.request(&context, Utc::now()).await? {
                RecommendationOutcome::Granted(record) => print_json(&record)?,
                RecommendationOutcome::CoolingDown { until, remaining } => {
                    print_json(&gate_json(&GateState::CoolingDown { until, remaining }))?
                }
            }
        }

        SubCommand::Cooldown { user } => {
            let store = open_store(&config)?;
            let gate = CooldownGate::from_config(&config.recommendation);
            let state = gate.check(store.as_ref(), &user, Utc::now())?;
            print_json(&gate_json(&state))?;
        }

        SubCommand::History { user, limit } => {
            let store = open_store(&config)?;
            let records =
                growmonitor::storage::RecommendationStore::history(store.as_ref(), &user, limit)?;
            print_json(&records)?;
        }
    }

    Ok(())
}
