//! Girder Console
//!
//! Runs a simulated glue job from the terminal.

use clap::Parser;
use girder_console::{CliArgs, ConsoleConfig, ConsoleRunner, RunOutcome, RunSummary};
use girder_core::GaugeReading;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,girder_console=debug,girder_core=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format when piping into a collector (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn gauge_line(gauge: &GaugeReading) -> String {
    format!(
        "{:<12} {:>8}  ({:?}, range {}-{})",
        gauge.title,
        gauge.display(),
        gauge.status(),
        gauge.min,
        gauge.max
    )
}

fn print_summary(summary: &RunSummary) {
    println!();
    match &summary.outcome {
        RunOutcome::Completed(done) => println!(
            "Completed: {} segments at {}mm",
            done.segment_count, done.thickness
        ),
        RunOutcome::Interrupted => println!("Interrupted at {}%", summary.progress),
    }
    println!("AI suggested: {}", summary.suggested.join(", "));

    println!("\nStatus log:");
    for line in &summary.status_log {
        println!("  {line}");
    }

    if !summary.alerts.is_empty() {
        println!("\nAlerts:");
        for alert in &summary.alerts {
            println!("  [{:?}] {}", alert.level, alert.message);
        }
    }

    println!("\nEnvironment:");
    println!("  {}", gauge_line(&summary.environment.temperature));
    println!("  {}", gauge_line(&summary.environment.humidity));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = ConsoleConfig::from_args(args)?;
    tracing::debug!(?config, "Console configuration");

    let runner = ConsoleRunner::new(&config)?;
    let summary = runner
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    print_summary(&summary);
    Ok(())
}
