//! Shady command line
//!
//! Meant to be called from the IDE's pre/post build hooks:
//! `shady <project> --pre` before shaders are compiled and
//! `shady <project> --post` afterwards.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use shady::{Archive, BuildOptions, Project};
use shady_config::{Config, PROJECT_CONFIG_FILE};
use shady_core::ExpandOptions;

#[derive(Parser, Debug)]
#[command(name = "shady", version, about)]
struct Cli {
    /// Project directory containing the shader folder
    project: PathBuf,

    #[command(flatten)]
    mode: Mode,

    /// Configuration file to use instead of the usual lookup
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Classification worker count
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    workers: Option<u16>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Mode {
    /// Expand shaders in place before compilation
    #[arg(long)]
    pre: bool,

    /// Restore the original shaders after compilation
    #[arg(long)]
    post: bool,

    /// Restore the original shaders and delete cached expansions
    #[arg(long)]
    clean: bool,

    /// Write a default shady.toml into the project directory
    #[arg(long)]
    init: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,shady=info,shady_core=info"),
    )
    .init();

    let cli = Cli::parse();
    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if cli.mode.init {
        let path = cli.project.join(PROJECT_CONFIG_FILE);
        if path.exists() {
            log::warn!("{:?} already exists, leaving it untouched", path);
            return Ok(());
        }
        return Config::save_default(&path).with_context(|| format!("Failed to write {:?}", path));
    }

    let config = Config::load(&cli.project, cli.config.as_deref()).context("Failed to load configuration")?;
    let archive = Archive::from_config(&config.archive);
    let options = BuildOptions {
        workers: cli.workers.map_or(config.build.workers, usize::from),
        expand: ExpandOptions {
            line_offset: config.build.line_offset,
        },
    };
    let project = Project::new(&cli.project, config.build);

    if cli.mode.pre {
        let report = shady::pre(&project, &options, archive.as_ref())?;
        log::info!(
            "{} shaders, {} expanded, {} cache files written, {} problems",
            report.shaders,
            report.replaced,
            report.cached,
            report.diagnostics.len()
        );
    } else if cli.mode.post {
        shady::post(&project, archive.as_ref())?;
    } else if cli.mode.clean {
        let removed = shady::clean(&project)?;
        log::info!("Removed {} cache files", removed);
    }

    Ok(())
}
