use miette::{Context, IntoDiagnostic, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;


/// Installs a console subscriber printing events at `level` and above to stderr.
///
/// `RUST_LOG`-style directives are not read; the level comes from the command line.
pub fn initialize_tracing(level: LevelFilter) -> Result<()> {
    let console_level_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .parse("")
        .into_diagnostic()
        .wrap_err("Failed to build the console level filter.")?;

    tracing_subscriber::fmt()
        .with_env_filter(console_level_filter)
        .with_writer(std::io::stderr)
        .with_target(level >= LevelFilter::DEBUG)
        .try_init()
        .map_err(|error| miette::miette!("Failed to install tracing subscriber: {error}"))
}
