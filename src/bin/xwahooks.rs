// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use xwahooks::{
    config::SetupConfig,
    install::Installation,
    listing::{parse_listing, Channel},
    path::default_config_path,
    settings::{merge, MergeOutcome, SettingsDocument},
    setup,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{fs::read_to_string, path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "xwahooks [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Working directory that configured paths are relative to.
    #[arg(short = 'C', long, global = true, value_name = "dir", default_value = ".")]
    pub directory: PathBuf,

    /// Path to configuration file.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config)?;
        match self.command {
            Command::Run => run_all(&config, self.directory),
            Command::Setup => run_setup(&config, self.directory),
            Command::Update => run_update(&config, self.directory),
            Command::Merge(opts) => run_merge(opts),
            Command::List(opts) => run_list(&config, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Generate setup directory, then update installation with it.
    #[command(override_usage = "xwahooks run [options]")]
    Run,

    /// Generate setup directory from hook packages.
    #[command(override_usage = "xwahooks setup [options]")]
    Setup,

    /// Update installation with current setup directory.
    #[command(override_usage = "xwahooks update [options]")]
    Update,

    /// Merge installed settings into generated settings file.
    #[command(override_usage = "xwahooks merge [options] <current> <generated>")]
    Merge(MergeOptions),

    /// List hook packages named by listing document.
    #[command(override_usage = "xwahooks list [options] <listing>")]
    List(ListOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct MergeOptions {
    /// Previously installed settings file.
    #[arg(required = true, value_name = "current")]
    pub current: PathBuf,

    /// Freshly generated settings file to rewrite in place.
    #[arg(required = true, value_name = "generated")]
    pub generated: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    /// Listing document to read package names from.
    #[arg(required = true, value_name = "listing")]
    pub listing: PathBuf,

    /// List work-in-progress packages instead of stable ones.
    #[arg(short, long)]
    pub wip: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_config(path: Option<PathBuf>) -> Result<SetupConfig> {
    let path = match path {
        Some(path) => path,
        None => match default_config_path() {
            Ok(path) if path.is_file() => path,
            _ => return Ok(SetupConfig::default()),
        },
    };

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read configuration file {:?}", path.display()))?;
    Ok(data.parse()?)
}

fn run_all(config: &SetupConfig, workdir: PathBuf) -> Result<()> {
    run_setup(config, workdir.clone())?;
    run_update(config, workdir)
}

fn run_setup(config: &SetupConfig, workdir: PathBuf) -> Result<()> {
    let report = setup::run(config, workdir, setup::progress_bar()?)?;
    info!(
        "set up {} hook packages in {:?}",
        report.packages.len(),
        report.setup_dir.display()
    );

    Ok(())
}

fn run_update(config: &SetupConfig, workdir: PathBuf) -> Result<()> {
    let paths = config.resolve(workdir);
    let Some(installation) = Installation::detect(&paths.install) else {
        warn!(
            "no installation with settings found in {:?}, skipping update",
            paths.install.display()
        );
        return Ok(());
    };

    installation.update(&paths.setup)?;

    Ok(())
}

fn run_merge(opts: MergeOptions) -> Result<()> {
    let current = SettingsDocument::load(&opts.current)?;
    let mut generated = SettingsDocument::load(&opts.generated)?;

    for (section, outcome) in merge(&current, &mut generated) {
        if outcome == MergeOutcome::Overridden {
            info!("[{section}] keeps its own defaults");
        }
    }

    generated.save(&opts.generated)?;

    Ok(())
}

fn run_list(config: &SetupConfig, opts: ListOptions) -> Result<()> {
    let data = read_to_string(&opts.listing)
        .with_context(|| format!("failed to read listing {:?}", opts.listing.display()))?;
    let channel = if opts.wip { Channel::Wip } else { Channel::Stable };
    let names = parse_listing(&data, channel, &config.packages.prefix);

    for (index, name) in names.iter().enumerate() {
        println!("[{}/{}] {name}", index + 1, names.len());
    }

    Ok(())
}
