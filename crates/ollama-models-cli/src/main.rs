use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use console::Style;
use ollama_models_core::{
    criteria::Criterion,
    extract::extract_records,
    format::{render_capabilities, render_matches},
    library::LibraryClient,
    query::Query,
    store::{DirStore, RecordSource},
};

fn s_err() -> Style { Style::new().color256(167) }  // red
fn s_dim() -> Style { Style::new().color256(248) }  // light gray

#[derive(Parser)]
#[command(
    name = "ollama-models",
    about = "Filter and search Ollama models by name, capability, size, popularity, and recency",
    version,
    after_help = "examples:\n  \
        ollama-models --all                      (every model, every variant)\n  \
        ollama-models -n llama                   (all llama models)\n  \
        ollama-models -c vision                  (vision-capable models)\n  \
        ollama-models -s -7                      (7B parameters or less, smallest first)\n  \
        ollama-models -s +4 -s -12               (between 4B and 12B)\n  \
        ollama-models -p +1M                     (1M+ pulls, most popular first)\n  \
        ollama-models -p top5                    (5 most pulled models)\n  \
        ollama-models -u 'since:6 months ago'    (recently updated, newest first)\n  \
        ollama-models -n llama -c tools -s -10\n  \
        ollama-models update                     (refresh the record store)"
)]
struct Cli {
    /// Model name substring, case-insensitive (repeatable)
    #[arg(short, long)]
    name: Vec<String>,

    /// Required capability, e.g. vision, tools, embedding (repeatable)
    #[arg(short, long)]
    capability: Vec<String>,

    /// Parameter size in billions: `n`/`-n` for <= n, `+n` for >= n (repeatable)
    #[arg(short, long, allow_hyphen_values = true)]
    size: Vec<String>,

    /// Popularity: `top<n>`, `+<pulls>` for >=, `-<pulls>` for <= (repeatable)
    #[arg(short, long, allow_hyphen_values = true)]
    popularity: Vec<String>,

    /// Update recency: `since:<duration> ago`, `after:<date>`, `before:<date>` (repeatable)
    #[arg(short, long)]
    updated: Vec<String>,

    /// Directory containing model JSON files (defaults to the system or user directory)
    #[arg(short = 'd', long)]
    models_dir: Option<PathBuf>,

    /// List all available capabilities
    #[arg(short = 'l', long)]
    list_capabilities: bool,

    /// List all models (all variants)
    #[arg(short = 'a', long)]
    all: bool,

    /// Show which records were excluded and why
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the record store from the library page
    Update {
        /// Cleaned library HTML file (fetched from the network when absent)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output directory for model JSON files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

/// Rebuild the criterion sequence in true command-line order, so the
/// "last filter wins" sort selection sees the order the user typed, not
/// the order of the struct fields.
fn ordered_criteria(
    cli: &Cli,
    matches: &ArgMatches,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<Criterion>> {
    let mut indexed: Vec<(usize, Criterion)> = Vec::new();

    if let Some(indices) = matches.indices_of("name") {
        for (i, value) in indices.zip(&cli.name) {
            indexed.push((i, Criterion::Name(value.clone())));
        }
    }
    if let Some(indices) = matches.indices_of("capability") {
        for (i, value) in indices.zip(&cli.capability) {
            indexed.push((i, Criterion::Capability(value.clone())));
        }
    }
    if let Some(indices) = matches.indices_of("size") {
        for (i, value) in indices.zip(&cli.size) {
            indexed.push((i, Criterion::parse_size(value)?));
        }
    }
    if let Some(indices) = matches.indices_of("popularity") {
        for (i, value) in indices.zip(&cli.popularity) {
            indexed.push((i, Criterion::parse_popularity(value)?));
        }
    }
    if let Some(indices) = matches.indices_of("updated") {
        for (i, value) in indices.zip(&cli.updated) {
            indexed.push((i, Criterion::parse_updated(value, now)?));
        }
    }

    indexed.sort_by_key(|(i, _)| *i);
    Ok(indexed.into_iter().map(|(_, c)| c).collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(Commands::Update { input, output_dir }) = cli.command {
        return cmd_update(input, output_dir).await;
    }

    let now = chrono::Utc::now().naive_utc();
    let criteria = match ordered_criteria(&cli, &matches, now) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", s_err().apply_to(format!("error: {e}")));
            std::process::exit(2);
        }
    };

    let store = match cli.models_dir {
        Some(dir) => DirStore::new(dir),
        None => DirStore::locate()?,
    };

    if cli.list_capabilities {
        let records = store.load()?;
        for line in render_capabilities(&records) {
            println!("{line}");
        }
        return Ok(());
    }

    if criteria.is_empty() && !cli.all {
        Cli::command().print_help()?;
        std::process::exit(1);
    }

    let records = store.load()?;
    let results = Query::new(criteria).evaluate(&records);
    for line in render_matches(&results) {
        println!("{line}");
    }
    Ok(())
}

async fn cmd_update(
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let html = match input {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?,
        None => {
            eprintln!("{}", s_dim().apply_to("fetching library page..."));
            LibraryClient::new().fetch_library().await?
        }
    };

    let records = extract_records(&html);
    if records.is_empty() {
        anyhow::bail!("no model items found in the library page");
    }

    let store = match output_dir {
        Some(dir) => DirStore::new(dir),
        None => DirStore::locate_writable()?,
    };
    store.create()?;

    for record in &records {
        store.write_record(record)?;
        println!("extracted: {}", record.model);
    }
    println!(
        "{}",
        s_dim().apply_to(format!(
            "{} models written to {}",
            records.len(),
            store.path().display()
        ))
    );
    Ok(())
}
