use clap::Parser;
use cyhy_config::{loader, validation, ConfigLocator, CyHyConfiguration};
use miette::{Context, IntoDiagnostic, Result};
use tracing::{debug, info};

use crate::{cli::CLIArgs, logging::initialize_tracing};

mod cli;
mod logging;


fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    initialize_tracing(cli_args.log_level.level_filter())
        .wrap_err("Failed to initialize tracing.")?;


    // Find the configuration file.
    let source = ConfigLocator::from_process()
        .find(cli_args.configuration_file_path.as_deref())
        .wrap_err("Failed to find a CyHy configuration file.")?;

    if let Some(file_path) = source.file_path() {
        let configuration_file_path = dunce::canonicalize(file_path)
            .into_diagnostic()
            .wrap_err("Could not canonicalize configuration file path!")?;

        info!(
            "Loading configuration: {} ({}).",
            configuration_file_path.display(),
            source.origin
        );
    }


    // Read and validate the configuration file.
    let tree = loader::load(&source).wrap_err("Could not load configuration file!")?;
    let configuration = validation::validate::<CyHyConfiguration>(tree)
        .wrap_err("Configuration file is not valid.")?;

    debug!("Parsed configuration:\n{:#?}", configuration);
    info!(
        "Configuration is valid: {} database(s), {} mode(s).",
        configuration.databases.len(),
        configuration.modes.len()
    );


    Ok(())
}
