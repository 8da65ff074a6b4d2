use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

use hostpulse::agent::Agent;
use hostpulse::config::{self, Settings};
use hostpulse::display::layout;
use hostpulse::display::snapshot::DisplaySnapshot;
use hostpulse::format::{format_bytes, format_percent, format_uptime};
use hostpulse::sampler::snapshot::StatsSnapshot;
use hostpulse::store::SnapshotStore;

#[derive(Parser)]
#[command(
    name = "hostpulse",
    about = "Background host sampler publishing shared stats and display snapshots"
)]
struct Cli {
    /// Override the shared data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the sampling agent (the default)
    Run {
        /// Sample and persist once, then exit
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Print the latest persisted snapshots
    Show,
    /// Delete the persisted snapshots
    Reset,
    /// Persist a new sampling interval in seconds
    SetInterval { secs: f64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let root = cli.data_dir.or_else(config::shared_root);

    match cli.command.unwrap_or(Command::Run { once: false }) {
        Command::Run { once } => {
            let mut agent = Agent::new(root);
            if once {
                agent.tick();
            } else {
                agent.run().await;
            }
        }
        Command::Show => show(root)?,
        Command::Reset => {
            let stats: SnapshotStore<StatsSnapshot> =
                SnapshotStore::new(root.clone(), config::STATS_FILE);
            let displays: SnapshotStore<DisplaySnapshot> =
                SnapshotStore::new(root, config::DISPLAYS_FILE);
            stats.reset()?;
            displays.reset()?;
            println!("Persisted snapshots removed.");
        }
        Command::SetInterval { secs } => {
            if secs <= 0.0 {
                return Err(eyre!("interval must be positive, got {secs}"));
            }
            let root = root.ok_or_else(|| eyre!("shared data directory unavailable"))?;
            config::save_settings(&root, &Settings { interval_secs: secs })?;
            println!("Sampling interval set to {secs}s (applies on the agent's next cycle).");
        }
    }

    Ok(())
}

/// Consumer-side view of the latest snapshots. Absent and corrupt data both
/// render as "no data yet": a stale or missing file is a normal state while
/// the agent is not running.
fn show(root: Option<PathBuf>) -> Result<()> {
    let stats_store: SnapshotStore<StatsSnapshot> =
        SnapshotStore::new(root.clone(), config::STATS_FILE);
    let display_store: SnapshotStore<DisplaySnapshot> =
        SnapshotStore::new(root, config::DISPLAYS_FILE);

    match stats_store.read_latest() {
        Ok(Some(stats)) => {
            println!("Stats at {}", stats.timestamp.to_rfc3339());
            println!("  cpu     {}", format_percent(stats.cpu.total));
            for (index, core) in stats.cpu.per_core.iter().enumerate() {
                println!("  core {index:<3}{}", format_percent(*core));
            }
            println!(
                "  memory  {} / {} (swap {})",
                format_bytes(stats.memory.used_bytes),
                format_bytes(stats.memory.total_bytes),
                format_bytes(stats.memory.swap_used_bytes),
            );
            println!("  uptime  {}", format_uptime(stats.uptime));
            println!(
                "  history {} cpu / {} memory samples over {}s",
                stats.history.cpu.len(),
                stats.history.memory.len(),
                stats.history.window_sec,
            );
        }
        Ok(None) | Err(_) => println!("Stats: no data yet."),
    }

    match display_store.read_latest() {
        Ok(Some(snapshot)) => {
            println!("Displays at {}", snapshot.timestamp.to_rfc3339());
            for display in &snapshot.displays {
                let mut flags = Vec::new();
                if display.is_main {
                    flags.push("main");
                }
                if display.is_builtin {
                    flags.push("builtin");
                }
                if let Some(target) = display.mirrored_to {
                    println!(
                        "  #{} {} mirrors #{target}",
                        display.id, display.name
                    );
                    continue;
                }
                println!(
                    "  #{} {} {}x{} @{}x{}",
                    display.id,
                    display.name,
                    display.pixel_size.width,
                    display.pixel_size.height,
                    display.scale,
                    if flags.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", flags.join(", "))
                    },
                );
            }
            for placed in layout::normalize(&snapshot.displays) {
                println!(
                    "  layout #{:<3} x={:.2} y={:.2} w={:.2} h={:.2}",
                    placed.id, placed.rect.x, placed.rect.y, placed.rect.width, placed.rect.height,
                );
            }
        }
        Ok(None) | Err(_) => println!("Displays: no data yet."),
    }

    Ok(())
}
