use clap::Parser;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trueview_stats::collectors::{
    self,
    profile::{Platform, Profile, ProfileOptions},
};
use trueview_stats::config::Config;
use trueview_stats::snapshot::Snapshot;

#[derive(Parser, Debug)]
#[command(name = "trueview-stats")]
#[command(version)]
#[command(about = "Print one JSON health snapshot of a TrueNAS host")]
struct Cli {
    /// YAML configuration file; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,
    /// Print the bundled example configuration and exit.
    #[arg(long)]
    print_default_config: bool,
    /// Pretty-print the snapshot.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match cli.config.as_deref() {
        Some(path) => Config::load_from_file(path).unwrap_or_else(|err| {
            error!(error = %err, "failed to load configuration, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };

    let time_t = now_unix();
    let platform = Platform::detect();
    let profile = Profile::for_platform(platform, &ProfileOptions::from_config(&cfg));
    info!(?platform, probes = profile.probes.len(), "collecting snapshot");

    let snapshot = collectors::capture(profile, &cfg.deadlines, time_t).await;
    println!("{}", render(&snapshot, cli.pretty));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Serializes the snapshot; on failure the document degrades to the
/// timestamp alone so consumers still receive valid JSON.
fn render(snapshot: &Snapshot, pretty: bool) -> String {
    let encoded = if pretty {
        serde_json::to_string_pretty(snapshot)
    } else {
        serde_json::to_string(snapshot)
    };
    encoded.unwrap_or_else(|err| {
        error!(error = %err, "failed to serialize snapshot");
        format!("{{\"time_t\":{}}}", snapshot.time_t)
    })
}
