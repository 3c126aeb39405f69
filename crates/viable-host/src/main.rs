//! Viable host emulator entry point.
//!
//! Emulates a keyboard running the Viable configuration protocol.  Packets
//! arrive on stdin as hex lines and replies leave on stdout, so the emulator
//! can sit behind a pipe, a socket relay, or a test script.  Logs go to
//! stderr.
//!
//! # Usage
//!
//! ```text
//! viable-host [OPTIONS]
//!
//! Options:
//!   --config     <PATH>  Host configuration file [default: viable-host.toml]
//!   --store      <PATH>  Store file, overrides [storage].store_path
//!   --definition <PATH>  Definition blob, overrides [storage].definition_path
//!   --dump               Print a JSON snapshot of the store and exit
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML, defaults when absent
//!  └─ open_device()          -- file store + init (stamp check)
//!  └─ PacketRouter::new()    -- wrapper sessions seeded from the clock
//!  └─ serve()                -- stdin → router → stdout until EOF / Ctrl-C
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use viable_core::PacketRouter;
use viable_host::application::dump_state::StateSnapshot;
use viable_host::application::open_device::open_device;
use viable_host::application::serve_packets::serve;
use viable_host::infrastructure::clock::SystemClock;
use viable_host::infrastructure::legacy::ViaLegacy;
use viable_host::infrastructure::sinks::TracingActions;
use viable_host::infrastructure::storage::config::load_config;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Viable keyboard emulator: hex packets on stdin, replies on stdout.
#[derive(Debug, Parser)]
#[command(name = "viable-host", version)]
struct Cli {
    /// Host configuration file.  Missing file means all defaults.
    #[arg(long, default_value = "viable-host.toml", env = "VIABLE_HOST_CONFIG")]
    config: PathBuf,

    /// Store file, overriding `[storage].store_path`.
    #[arg(long, env = "VIABLE_STORE")]
    store: Option<PathBuf>,

    /// Keyboard definition blob, overriding `[storage].definition_path`.
    #[arg(long, env = "VIABLE_DEFINITION")]
    definition: Option<PathBuf>,

    /// Print a JSON snapshot of every table and exit.
    #[arg(long)]
    dump: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(store) = cli.store {
        config.storage.store_path = store;
    }
    if let Some(definition) = cli.definition {
        config.storage.definition_path = Some(definition);
    }

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.host.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let viable = open_device(&config).context("opening device")?;

    if cli.dump {
        let snapshot = StateSnapshot::capture(&viable).context("reading store")?;
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    let mut router = PacketRouter::new(viable, ViaLegacy, SystemClock::new());
    let mut actions = TracingActions::default();
    info!(
        packet_size = config.host.packet_size,
        "Viable host ready.  Reading packets from stdin."
    );

    let stats = tokio::select! {
        result = serve(
            &mut router,
            &mut actions,
            tokio::io::stdin(),
            tokio::io::stdout(),
            config.host.packet_size,
        ) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Default::default()
        }
    };

    info!(
        packets = stats.packets,
        replies = stats.replies,
        rejected = stats.rejected,
        "Viable host stopped"
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange / Act
        let cli = Cli::parse_from(["viable-host"]);

        // Assert
        assert_eq!(cli.config, PathBuf::from("viable-host.toml"));
        assert!(!cli.dump);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "viable-host",
            "--store",
            "/tmp/kb.bin",
            "--definition",
            "kb.def",
            "--dump",
        ]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/kb.bin")));
        assert_eq!(cli.definition, Some(PathBuf::from("kb.def")));
        assert!(cli.dump);
    }
}
