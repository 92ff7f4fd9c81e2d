mod cli;
mod commands;
mod common;
mod config;
mod engines;
mod error;
mod media;
mod pipeline;
mod subtitles;
mod ui;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::config::ReelConfig;
use crate::ui::prelude::{Level, emit};

fn load_config(cli: &Cli) -> Result<ReelConfig> {
    let config = match &cli.config {
        Some(path) => ReelConfig::load_from_path(path)?,
        None => ReelConfig::load()?,
    };
    Ok(config.with_env_overrides())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    emit(
        Level::Debug,
        "reel.config.loaded",
        &format!(
            "Language {}, voice {}, model {}",
            config.language, config.voice, config.script.model
        ),
        None,
    );

    match cli.command {
        Commands::Generate(args) => commands::handle_generate(config, args),
        Commands::Subtitles(args) => commands::handle_subtitles(config, args),
    }
}

fn main() {
    let cli = Cli::parse();

    ui::init(cli.output_format, !cli.no_color);
    ui::set_debug_mode(cli.debug);
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = run(cli) {
        emit(Level::Error, "reel.error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}
