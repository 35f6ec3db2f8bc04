//! pandoc-styles
//!
//! Runs pandoc with options collected from reusable, inheritable styles.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use pandoc_styles::build::{AppContext, Build, build_documents, folder_files};
use pandoc_styles::cli::Cli;
use pandoc_styles::config::{ConfigLoader, ConfigPaths};
use pandoc_styles::logging;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.log_level()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every format of every document was built.
fn run(cli: Cli) -> Result<bool> {
    let paths = ConfigPaths::discover();
    if cli.init {
        if !paths.init()? {
            info!(path = %paths.config_dir.display(), "Configuration directory already exists");
        }
        return Ok(true);
    }

    let files = match &cli.folder {
        Some(folder) => folder_files(folder, &cli.extensions)?,
        None => cli.files.clone(),
    };
    let documents = cli.documents(files);
    if documents.is_empty() && cli.metadata.is_none() {
        Cli::command().print_help()?;
        return Ok(true);
    }
    let documents = if documents.is_empty() {
        vec![Vec::new()]
    } else {
        documents
    };

    if let Some(dir) = &cli.working_dir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("changing to working dir {}", dir.display()))?;
    }

    let loader = ConfigLoader::load_with_paths(paths)?;
    let ctx = AppContext::new(loader.paths.clone(), loader.into_config());

    let documents = documents.into_iter().map(|files| cli.build_options(files));
    Ok(build_documents(documents, |options| {
        let mut build = Build::new(options, &ctx)?;
        if !cli.print {
            return Ok(build.run()?.is_success());
        }
        if let Some(format) = build.formats().first().cloned() {
            print!("{}", build.output(&format)?);
        }
        Ok(true)
    }))
}
