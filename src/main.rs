use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vitals::{
    ConstructCatalog, EngineConfig, FileSource, FrameSource, Scope, VehicleRepresentation,
};

/// Bar characters for the confidence sparkline, low to high.
const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Parser, Debug)]
#[command(name = "vitals")]
#[command(about = "Replay recorded telemetry through the vehicle health engine")]
struct Args {
    /// Engine configuration (channels, tests, constructs)
    #[arg(short, long, default_value = "engine.toml")]
    config: PathBuf,

    /// JSON-lines telemetry recording, one frame per line
    #[arg(short, long)]
    frames: PathBuf,

    /// Write the final engine state to a JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Construct scope for the exported state: "status", "all" or any tag.
    /// May be repeated.
    #[arg(short, long, default_value = "status")]
    scope: Vec<String>,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet);

    let config = EngineConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let catalog = ConstructCatalog::with_builtins();
    let mut vehicle = VehicleRepresentation::from_config(&config, &catalog)?;

    info!(
        channels = vehicle.headers().len(),
        constructs = vehicle.construct_names().count(),
        "engine ready"
    );

    let mut source = FileSource::new(&args.frames);
    info!(source = source.description(), "replaying");

    while !source.exhausted() {
        let Some(frame) = source.poll() else {
            continue;
        };
        match vehicle.update(&frame) {
            Ok(diagnostics) => {
                if !diagnostics.is_clean() {
                    warn!(
                        cycle = diagnostics.cycle,
                        tests = diagnostics.test_failures.len(),
                        constructs = diagnostics.construct_failures.len(),
                        "cycle completed with failures"
                    );
                }
                if !args.quiet {
                    print_cycle(&vehicle);
                }
            }
            Err(e) => warn!(line = source.line_number(), error = %e, "frame rejected"),
        }
    }

    if let Some(error) = source.error() {
        warn!(error = %error, "replay finished with errors");
    }

    print_summary(&vehicle);

    if let Some(export_path) = args.export {
        let scope = parse_scope(&args.scope);
        export_to_file(&vehicle, &scope, &export_path)?;
        println!("Exported state to {}", export_path.display());
    }

    Ok(())
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn parse_scope(values: &[String]) -> Scope {
    if values.iter().any(|v| v == "all") {
        Scope::All
    } else {
        Scope::tags(values.iter().cloned())
    }
}

fn print_cycle(vehicle: &VehicleRepresentation) {
    let status = vehicle.status();
    let time = vehicle
        .current_time()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mnemonics: Vec<String> = vehicle
        .faulting_mnemonics()
        .into_iter()
        .map(|(_, m)| m.to_string())
        .collect();

    println!(
        "{:>6}  t={:<12} {:<4}  {:.3}  {}",
        vehicle.cycle(),
        time,
        status.severity.symbol(),
        status.confidence,
        mnemonics.join(",")
    );
}

fn print_summary(vehicle: &VehicleRepresentation) {
    let status = vehicle.status();
    let history = vehicle.history();

    println!();
    println!("Cycles:     {}", vehicle.cycle());
    println!("Status:     {} ({:.3})", status.severity, status.confidence);

    let counts: Vec<String> = history
        .severity_counts()
        .iter()
        .map(|(severity, count)| format!("{}={}", severity.symbol(), count))
        .collect();
    println!("Recent:     {}", counts.join(" "));

    let sparkline: String = history
        .confidence_sparkline()
        .into_iter()
        .map(|level| SPARK_BARS[usize::from(level.min(7))])
        .collect();
    if !sparkline.is_empty() {
        println!("Confidence: {}", sparkline);
    }

    let faulting = vehicle.faulting_mnemonics();
    if !faulting.is_empty() {
        println!("Faulting:");
        for (channel, mnemonic) in faulting {
            println!("  {:<24} {}", channel, mnemonic);
        }
    }
}

/// Export the final engine state to a JSON file.
fn export_to_file(vehicle: &VehicleRepresentation, scope: &Scope, export_path: &Path) -> Result<()> {
    use std::io::Write;

    let mut export = serde_json::Map::new();

    // Summary
    let status = vehicle.status();
    export.insert(
        "summary".to_string(),
        serde_json::json!({
            "cycles": vehicle.cycle(),
            "severity": status.severity,
            "confidence": status.confidence,
        }),
    );

    // Merged data keyed by channel
    let data: serde_json::Map<String, serde_json::Value> = vehicle
        .headers()
        .iter()
        .zip(vehicle.current_data())
        .map(|(name, reading)| {
            let value = reading
                .value()
                .map(|v| serde_json::json!(v))
                .unwrap_or(serde_json::Value::Null);
            (name.clone(), value)
        })
        .collect();
    export.insert("data".to_string(), serde_json::Value::Object(data));

    export.insert(
        "channels".to_string(),
        serde_json::to_value(vehicle.channel_statuses())?,
    );

    let mnemonics: Vec<serde_json::Value> = vehicle
        .faulting_mnemonics()
        .into_iter()
        .map(|(channel, mnemonic)| serde_json::json!({ "channel": channel, "mnemonic": mnemonic }))
        .collect();
    export.insert("mnemonics".to_string(), serde_json::json!(mnemonics));

    export.insert(
        "state".to_string(),
        serde_json::to_value(vehicle.state_report(scope))?,
    );
    export.insert(
        "diagnostics".to_string(),
        serde_json::to_value(vehicle.diagnostics())?,
    );

    let history: serde_json::Map<String, serde_json::Value> = vehicle
        .history()
        .severity_counts()
        .into_iter()
        .map(|(severity, count)| (severity.to_string(), serde_json::json!(count)))
        .collect();
    export.insert("history".to_string(), serde_json::Value::Object(history));

    let json = serde_json::to_string_pretty(&serde_json::Value::Object(export))?;
    let mut file = std::fs::File::create(export_path)
        .with_context(|| format!("creating {}", export_path.display()))?;
    file.write_all(json.as_bytes())?;

    Ok(())
}
