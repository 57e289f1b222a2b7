//! xpointerbarrier: entry point.
//!
//! Confines the pointer to each monitor with XFixes pointer barriers and
//! keeps them in step with the XRandR layout.
//!
//! # Usage
//!
//! ```text
//! xpointerbarrier <TOP> <LEFT> <RIGHT> <BOTTOM> [-v]
//! xpointerbarrier -k [-v]
//! xpointerbarrier -c [PATH] [-v]
//!
//! Options:
//!   -k, --katria         Read insets from the _KATRIA_INSETS root property
//!   -c, --config [PATH]  Read insets from a TOML file
//!                        [default: $XDG_CONFIG_HOME/xpointerbarrier/config.toml]
//!   -v, --verbose        Log every barrier created and destroyed
//! ```
//!
//! Send `SIGUSR1` to switch the barriers off and on again:
//!
//! ```text
//! pkill -USR1 xpointerbarrier
//! ```
//!
//! # Startup order
//!
//! ```text
//! main()
//!  └─ parse CLI, set up logging
//!  └─ validate command-line / config-file insets   (before connecting)
//!  └─ XDisplay::open()
//!  └─ poll _KATRIA_INSETS                           (only with -k)
//!  └─ require XFIXES >= 5.0
//!  └─ ToggleSignal::install()                       (SIGUSR1 blocked outside waits)
//!  └─ Reconciler::start() + Reconciler::run()       (never returns Ok)
//! ```
//!
//! Any error escaping `main` exits with status 1.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use xbarrier_core::Insets;
use xbarrier_daemon::infrastructure::config;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keep the pointer inside each monitor using XFixes pointer barriers.
///
/// Exactly one insets source is required: four integers, `-k`, or `-c`.
#[derive(Debug, Parser)]
#[command(
    name = "xpointerbarrier",
    about = "Confine the pointer to monitor edges with XFixes pointer barriers",
    version
)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["insets", "katria", "config"])
))]
struct Cli {
    /// Insets in pixels, in top/left/right/bottom order.
    #[arg(
        num_args = 4,
        value_names = ["TOP", "LEFT", "RIGHT", "BOTTOM"],
        allow_negative_numbers = true
    )]
    insets: Vec<i32>,

    /// Read insets from the `_KATRIA_INSETS` property on the root window.
    ///
    /// The property is polled once per second for up to 60 seconds.
    #[arg(short = 'k', long)]
    katria: bool,

    /// Read insets from a TOML config file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<Option<PathBuf>>,

    /// Log diagnostics (every barrier created and destroyed) to stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// Where the insets come from.
#[derive(Debug, PartialEq, Eq)]
enum InsetsSource {
    Arguments(Insets),
    ConfigFile(Insets),
    RootProperty,
}

impl Cli {
    /// Resolves every insets source that needs no display connection.
    ///
    /// # Errors
    ///
    /// Returns an error for negative insets or an unreadable config file.
    fn insets_source(&self) -> anyhow::Result<InsetsSource> {
        if self.katria {
            return Ok(InsetsSource::RootProperty);
        }

        if let Some(path) = &self.config {
            let path = match path {
                Some(path) => path.clone(),
                None => config::default_config_path()?,
            };
            let file = config::load_config(&path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            return Ok(InsetsSource::ConfigFile(file.insets));
        }

        match self.insets[..] {
            [top, left, right, bottom] => {
                let insets = Insets::new(top, left, right, bottom).context("invalid insets")?;
                Ok(InsetsSource::Arguments(insets))
            }
            _ => anyhow::bail!("expected four insets: <TOP> <LEFT> <RIGHT> <BOTTOM>"),
        }
    }
}

/// Parses the command line, exiting with status 1 on usage errors.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

/// Sets up `tracing` on stderr.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// default is `warn`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let source = cli.insets_source()?;
    run(source)
}

#[cfg(target_os = "linux")]
fn run(source: InsetsSource) -> anyhow::Result<()> {
    use tracing::info;
    use xbarrier_daemon::application::lifecycle::BarrierManager;
    use xbarrier_daemon::application::load_insets::{poll_insets, PollPolicy};
    use xbarrier_daemon::application::reconcile::Reconciler;
    use xbarrier_daemon::infrastructure::display::XDisplay;
    use xbarrier_daemon::infrastructure::signal::ToggleSignal;

    let mut display = XDisplay::open()?;

    let insets = match source {
        InsetsSource::Arguments(insets) | InsetsSource::ConfigFile(insets) => insets,
        InsetsSource::RootProperty => {
            poll_insets(&mut display, PollPolicy::default(), std::thread::sleep)?
        }
    };
    info!("insets: {insets}");

    display.require_barrier_support()?;
    let toggle = ToggleSignal::install().context("cannot set up handler for SIGUSR1")?;

    let mut reconciler = Reconciler::new(BarrierManager::new(display, insets), toggle);
    reconciler.start()?;
    info!("barriers active; send SIGUSR1 to toggle");

    match reconciler.run()? {}
}

#[cfg(not(target_os = "linux"))]
fn run(_source: InsetsSource) -> anyhow::Result<()> {
    Err(xbarrier_daemon::infrastructure::display::StartupError::Unsupported.into())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
