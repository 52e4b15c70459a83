use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use codetree::config::AppConfig;
use codetree::core::{AsciiRenderer, DebugSink, FileProcessor, Phase, ProgressUpdate};
use codetree::sources::LocalSource;
use codetree::utils::format::{format_bytes, format_time};

/// Command-line arguments for Codetree
#[derive(Parser, Debug)]
#[command(
    name = "codetree",
    version,
    about = "Print a directory tree, code statistics and an ASCII rendering of a project"
)]
struct Args {
    /// Folder to process
    path: PathBuf,

    /// Additional ignore pattern, repeatable (substring match on the relative path)
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Do not apply the built-in ignore patterns
    #[arg(long)]
    no_default_ignores: bool,

    /// Honour .gitignore files while collecting
    #[arg(long)]
    gitignore: bool,

    /// Only keep files whose path contains this term
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Hide a path and its subtree from the rendered tree, repeatable
    #[arg(long, value_name = "PATH")]
    exclude: Vec<String>,

    /// Append line counts to files
    #[arg(long)]
    lines: bool,

    /// Append sizes to files
    #[arg(long)]
    sizes: bool,

    /// Wrap labels in size-classified <span> markers
    #[arg(long)]
    colors: bool,

    /// Prefix labels with file and folder icons
    #[arg(long)]
    icons: bool,

    /// Print the full result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reads in flight per batch
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.ignore_patterns.extend(args.ignore.iter().cloned());
    if args.no_default_ignores {
        config.use_default_ignore_patterns = false;
    }
    if args.gitignore {
        config.respect_gitignore = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.processing.read_concurrency = concurrency.max(1);
    }

    let mut render = config.render.clone();
    render.show_lines |= args.lines;
    render.show_sizes |= args.sizes;
    render.show_colors |= args.colors;
    render.show_icons |= args.icons;
    for path in &args.exclude {
        render.ignored_paths.insert(path.trim_end_matches('/'));
    }

    let handles = LocalSource::new(&args.path)
        .respect_gitignore(config.respect_gitignore)
        .collect()
        .await
        .with_context(|| format!("Failed to collect files from {}", args.path.display()))?;

    let mut processor = FileProcessor::from_config(&config);
    if let Some(term) = &args.search {
        processor = processor.with_search_term(term.as_str());
    }

    let last_phase = Mutex::new(None::<Phase>);
    let on_progress = |update: ProgressUpdate| {
        if let Ok(mut last) = last_phase.lock() {
            if *last != Some(update.phase) {
                tracing::info!("{} ({:.0}%)", update.phase, update.percent);
                *last = Some(update.phase);
            }
        }
        tracing::trace!(
            "{:.1}% ({}/{})",
            update.percent,
            update.processed,
            update.total
        );
    };

    let result = processor
        .process_files(&handles, on_progress, DebugSink::none())
        .await
        .context("Processing failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print!("{}", AsciiRenderer::render(&result.structure, &render));

    let summary = AsciiRenderer::summarize(&result.structure, &render.ignored_paths);
    let stats = &result.stats;
    println!();
    println!(
        "{} files, {} folders{}",
        summary.total_files,
        summary.total_folders,
        if summary.ignored_count > 0 {
            format!(", {} ignored", summary.ignored_count)
        } else {
            String::new()
        }
    );
    println!("Total lines: {}", stats.total_lines);
    println!("Total size: {}", format_bytes(stats.total_size));
    if stats.largest_file.lines > 0 {
        println!(
            "Largest file: {} ({} lines)",
            stats.largest_file.name, stats.largest_file.lines
        );
    }
    let top = stats.top_file_types(5);
    if !top.is_empty() {
        let listed: Vec<String> = top.iter().map(|(ext, count)| format!("{ext} ({count})")).collect();
        println!("Top file types: {}", listed.join(", "));
    }
    println!("Processing time: {}", format_time(stats.processing_time));

    Ok(())
}
