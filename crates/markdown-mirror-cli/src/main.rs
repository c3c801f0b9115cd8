mod tree;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use markdown_mirror_config::Config;
use markdown_mirror_engine::hierarchy::{
    CategoryFileLoader, HierarchyOptions, HierarchyResolver, format_segment_title,
};
use markdown_mirror_engine::render::{NotionRenderer, Renderer};
use markdown_mirror_engine::sync::{FileStatus, corpus_status};
use markdown_mirror_engine::watchdog;
use markdown_mirror_engine::{BlockConverter, StateRepository, parse_source, scan_markdown_files};

/// Shutdown window when no config file is involved.
const DEFAULT_SHUTDOWN_WINDOW: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "markdown-mirror")]
#[command(about = "Mirror a markdown documentation tree into a page workspace")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/markdown-mirror/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Docs directory, overriding the config file
    #[arg(long, global = true)]
    docs: Option<PathBuf>,

    /// Verbose logging and full error chains
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the destination blocks one file converts to
    Convert {
        /// Markdown file to convert
        file: PathBuf,

        /// Print the abstract blocks instead of destination JSON
        #[arg(long)]
        blocks: bool,
    },

    /// List files that a sync would create, replace or prune
    Status,

    /// Print the page tree a sync would build
    Tree,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let debug = cli.debug;
    match run(cli) {
        Ok(window) => {
            // Teardown after this point must finish inside the window.
            watchdog::arm(window);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if debug {
                eprintln!("Error: {e:?}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Runs the command and returns the shutdown window from config.
fn run(cli: Cli) -> Result<Duration> {
    match cli.command {
        Commands::Convert { ref file, blocks } => {
            convert(file, blocks)?;
            Ok(DEFAULT_SHUTDOWN_WINDOW)
        }
        Commands::Status => {
            let config = load_config(&cli)?;
            status(&config)?;
            Ok(Duration::from_secs(config.watchdog_secs))
        }
        Commands::Tree => {
            let config = load_config(&cli)?;
            tree(&config)?;
            Ok(Duration::from_secs(config.watchdog_secs))
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let loaded = Config::load_from_path(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let config = match (loaded, &cli.docs) {
        (Some(config), Some(docs)) => Config {
            docs_path: docs.clone(),
            ..config
        },
        (Some(config), None) => config,
        (None, Some(docs)) => Config::new(docs.clone()),
        (None, None) => bail!(
            "no docs directory given and no config file at {}",
            config_path.display()
        ),
    };
    log::debug!("Using docs directory {}", config.docs_path.display());

    config.validate(false)?;
    Ok(config)
}

fn convert(file: &Path, abstract_blocks: bool) -> Result<()> {
    let raw =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let parsed = parse_source(&raw);
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");
    let title = parsed.title_or(&format_segment_title(stem));

    let converted = BlockConverter::new().convert_document(&parsed.body);
    for degradation in &converted.degradations {
        log::warn!(
            "Bytes {}..{} kept as plain text: {}",
            degradation.span.start,
            degradation.span.end,
            degradation.reason
        );
    }

    let children = if abstract_blocks {
        serde_json::to_value(&converted.blocks)?
    } else {
        serde_json::Value::Array(NotionRenderer::new().render_blocks(&converted.blocks))
    };
    let output = serde_json::json!({ "title": title, "children": children });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let state = StateRepository::load(config.resolved_state_path())?;
    let files = scan_markdown_files(&config.docs_path, &config.exclude_patterns()?)?;
    let status = corpus_status(&state, &files)?;

    let mut up_to_date = 0;
    for (file, file_status) in &status.files {
        match file_status {
            FileStatus::New => println!("new       {file}"),
            FileStatus::Modified => println!("modified  {file}"),
            FileStatus::UpToDate => up_to_date += 1,
        }
    }
    for file in &status.orphaned {
        println!("orphaned  {file}");
    }
    println!(
        "{} out of date, {up_to_date} up to date, {} orphaned",
        status.out_of_date().count(),
        status.orphaned.len()
    );
    Ok(())
}

fn tree(config: &Config) -> Result<()> {
    let files = scan_markdown_files(&config.docs_path, &config.exclude_patterns()?)?;
    let options = HierarchyOptions {
        flat: config.flat,
        skip_segment: config.skip_segment().map(str::to_string),
        root_title: config.root_title.clone(),
        dry_run: true,
    };
    let resolver = HierarchyResolver::new(
        options,
        Box::new(CategoryFileLoader::new(&config.docs_path)),
    );
    let layout = tree::build_tree(&resolver, &config.root_title, &files);
    print!("{}", tree::render_tree(&layout));
    Ok(())
}
