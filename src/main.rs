use anyhow::{Context, Error};
use clap::Parser;
use genset_controller::{app, config::Config, util::logging};
use std::{fs, path::PathBuf};

#[derive(Debug, Parser)]
#[command(about = "Generator / AC transfer switch controller")]
struct Arguments {
    /// Path to the installation config (json)
    config_path: PathBuf,
}

fn main() -> Result<(), Error> {
    logging::configure(module_path!());

    let arguments = Arguments::parse();

    let config = fs::read_to_string(&arguments.config_path)
        .with_context(|| format!("reading {}", arguments.config_path.display()))?;
    let config = Config::parse(&config).context("config")?;

    app::run(&config)
}
