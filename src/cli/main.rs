use anyhow::{bail, Context};
use clap::Parser;
use live_search::config::{Config, ObservabilityConfig};
use live_search::search::{
    extract_context, highlight, read_records, render_marked, Preset, SearchEngine,
    SearchOptions, SortStrategy,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "live-search")]
#[command(about = "Search a JSON collection the way the dashboard search box does", long_about = None)]
struct Cli {
    /// JSON file holding an array of records
    #[arg(value_name = "FILE")]
    data: PathBuf,

    /// Search query
    #[arg(value_name = "QUERY", default_value = "")]
    query: String,

    /// Built-in configuration: people, files, tickets or proposals
    #[arg(short, long, value_parser = Preset::from_str)]
    preset: Option<Preset>,

    /// Fields to search, comma separated (ignored with --preset)
    #[arg(short, long, value_delimiter = ',', default_value = "title,name,description")]
    fields: Vec<String>,

    /// Sort strategy: relevance, date or alphabetical
    #[arg(short, long, value_parser = SortStrategy::from_str)]
    sort: Option<SortStrategy>,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Discrete filter, repeatable: --filter status=open
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file
    #[arg(short, long, env = "LIVE_SEARCH_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => {
            init_tracing(&config.observability);
            config
        }
        Err(e) => {
            let config = Config::default();
            init_tracing(&config.observability);
            tracing::warn!(error = %e, "Failed to load configuration, using defaults");
            config
        }
    };

    let records = read_records(&cli.data)
        .with_context(|| format!("loading records from {}", cli.data.display()))?;

    let mut options = match cli.preset {
        Some(preset) => preset.options(),
        None => SearchOptions::new(cli.fields.iter().map(String::as_str)),
    };
    if let Some(sort) = cli.sort {
        options = options.with_sort(sort);
    }
    for filter in &cli.filters {
        let Some((field, value)) = filter.split_once('=') else {
            bail!("filter '{}' is not of the form FIELD=VALUE", filter);
        };
        options = options.with_filter(field.trim(), value.trim());
    }

    let mut search_config = config.search.clone();
    if let Some(limit) = cli.limit {
        search_config.max_results = limit;
    }
    let context_window = search_config.context_window;

    tracing::info!(
        records = records.len(),
        query = %cli.query,
        "Running search"
    );

    let name = cli.preset.map_or_else(|| "cli".to_string(), |p| p.to_string());
    let engine = SearchEngine::new(name, records, options, search_config)?;
    engine.search(cli.query.as_str());
    engine.settle_now();
    let snapshot = engine.snapshot();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.results)?);
        return Ok(());
    }

    let (open, close) = if std::io::stdout().is_terminal() {
        ("\x1b[1;33m", "\x1b[0m")
    } else {
        ("[", "]")
    };

    for (rank, result) in snapshot.results.results.iter().enumerate() {
        let label = result.field.as_deref().unwrap_or("-");
        let text = result.matched.clone().unwrap_or_else(|| {
            result
                .record
                .get("title")
                .or_else(|| result.record.get("name"))
                .map(live_search::search::value_text)
                .unwrap_or_default()
        });
        let text = if text.chars().count() > context_window {
            extract_context(&text, &cli.query, context_window)
        } else {
            text
        };

        println!(
            "{:>3}. [{}] {:>7.1}  {}: {}",
            rank + 1,
            result.key,
            result.score,
            label,
            render_marked(&highlight(&text, &cli.query), open, close)
        );
    }

    if snapshot.is_empty {
        println!("No results for \"{}\"", cli.query);
    } else {
        println!(
            "Showing {} of {} records{}",
            snapshot.results.len(),
            snapshot.results.total_count,
            if snapshot.results.has_more { " (more available)" } else { "" }
        );
    }

    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("live_search={}", observability.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
