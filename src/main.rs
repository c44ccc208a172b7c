use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use exo_catalog::app::IngestUseCase;
use exo_catalog::config::CatalogConfig;
use exo_catalog::constants::{CONFIG_ENV_VAR, DEFAULT_STORE_PATH};
use exo_catalog::infra::FileEventLogAdapter;
use exo_catalog::logging;
use exo_catalog::observability;
use exo_catalog::pipeline::ingestion::JsonFileSource;
use exo_catalog::pipeline::storage::{Catalog, JsonFilePlanetStore, PlanetStore};
use exo_catalog::pipeline::Pipeline;
use exo_catalog::query::{
    Category, PageRequest, PlanetField, Predicate, QueryEngine, SortDirection, DEFAULT_PAGE_SIZE,
};

#[derive(Parser)]
#[command(name = "exo_catalog")]
#[command(about = "Exoplanet catalog normalization and query engine")]
#[command(version)]
struct Cli {
    /// TOML config file; falls back to $EXO_CATALOG_CONFIG, then built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding the normalized record set
    #[arg(long, global = true, default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    emit_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct PageArgs {
    /// Field to sort by
    #[arg(long, default_value = "name")]
    sort: String,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: usize,
}

#[derive(Args, Clone, Default)]
struct CategoryArgs {
    /// Window for recently-discovered, in years
    #[arg(long)]
    years: Option<u32>,
    /// Radius for nearby, in light years
    #[arg(long)]
    max_ly: Option<f64>,
    /// Lower orbital period for orbital-range, in days
    #[arg(long)]
    min_days: Option<f64>,
    /// Upper orbital period for orbital-range, in days
    #[arg(long)]
    max_days: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw catalog export and publish it as the record set
    Ingest {
        /// JSON array, single object, or JSON Lines file of raw rows
        #[arg(long)]
        input: PathBuf,
        /// Worker shards for the per-row stages
        #[arg(long, default_value_t = 1)]
        shards: usize,
        /// Write the per-row event log here as NDJSON
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// List planets, sorted and paged
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Look up one planet by exact name
    Get { name: String },
    /// Case-insensitive substring search on a text field
    Search {
        term: String,
        #[arg(long, default_value = "name")]
        field: String,
        /// Exact match instead of substring
        #[arg(long)]
        exact: bool,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Inclusive numeric range on one field; unknown values never match
    Range {
        #[arg(long)]
        field: String,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Apply a predefined category filter
    Category {
        /// earth-like, gas-giant, habitable-zone, recently-discovered,
        /// orbital-range, nearby or habitable-super-earths
        name: String,
        #[command(flatten)]
        params: CategoryArgs,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Pick one planet uniformly at random
    Random {
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        params: CategoryArgs,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Aggregate statistics
    Stats {
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        params: CategoryArgs,
    },
    /// Numeric series for report rendering
    Series {
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        params: CategoryArgs,
    },
}

fn load_config(flag: Option<PathBuf>) -> Result<CatalogConfig> {
    let path = flag.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading catalog config");
            CatalogConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(CatalogConfig::default()),
    }
}

fn page_request(args: &PageArgs) -> Result<PageRequest> {
    let field: PlanetField = args.sort.parse()?;
    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Ok(PageRequest::new(args.page_size, args.page)?.sorted_by(field, direction))
}

fn category(name: &str, params: &CategoryArgs) -> Result<Category> {
    let category = match name.parse::<Category>()? {
        Category::RecentlyDiscovered { .. } => Category::RecentlyDiscovered {
            years: params.years,
        },
        Category::Nearby { .. } => Category::Nearby {
            max_ly: params.max_ly,
        },
        Category::OrbitalRange { .. } => Category::OrbitalRange {
            min_days: params.min_days,
            max_days: params.max_days,
        },
        other => other,
    };
    Ok(category)
}

fn category_filter(
    engine: &QueryEngine,
    name: Option<&str>,
    params: &CategoryArgs,
) -> Result<Option<Predicate>> {
    match name {
        Some(name) => Ok(Some(engine.category_predicate(&category(name, params)?)?)),
        None => Ok(None),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    if cli.emit_metrics {
        if let Err(e) = observability::init() {
            warn!("Metrics disabled: {}", e);
        }
    }

    let config = load_config(cli.config)?;
    let store: Arc<dyn PlanetStore> = Arc::new(JsonFilePlanetStore::new(&cli.store));
    let catalog = Arc::new(Catalog::new());
    let use_case = IngestUseCase::new(Pipeline::from_config(&config), store, catalog.clone());

    if let Commands::Ingest {
        input,
        shards,
        events,
    } = &cli.command
    {
        let mut use_case = use_case.with_shards(*shards);
        if let Some(events) = events {
            use_case = use_case.with_event_log(Box::new(FileEventLogAdapter::new(events)));
        }
        let (report, _log) = use_case.ingest(&JsonFileSource::new(input)).await?;
        print_json(&report)?;
    } else {
        use_case.restore().await?;
        let engine = QueryEngine::new(catalog.current(), config.categories.clone());
        run_query(&engine, &cli.command)?;
    }

    if cli.emit_metrics {
        if let Some(text) = observability::render() {
            eprintln!("{}", text);
        }
    }
    Ok(())
}

fn run_query(engine: &QueryEngine, command: &Commands) -> Result<()> {
    match command {
        Commands::Ingest { .. } => Ok(()),
        Commands::List { paging } => print_json(&engine.list(&page_request(paging)?)),
        Commands::Get { name } => match engine.get(name) {
            Some(planet) => print_json(planet),
            None => anyhow::bail!("No planet named '{}'", name),
        },
        Commands::Search {
            term,
            field,
            exact,
            paging,
        } => {
            let field: PlanetField = field.parse()?;
            let request = page_request(paging)?;
            let result = if *exact {
                engine.find_exact(field, term, &request)?
            } else {
                engine.search(field, term, &request)?
            };
            print_json(&result)
        }
        Commands::Range {
            field,
            min,
            max,
            paging,
        } => {
            let field: PlanetField = field.parse()?;
            print_json(&engine.range(field, *min, *max, &page_request(paging)?)?)
        }
        Commands::Category {
            name,
            params,
            paging,
        } => {
            let category = category(name, params)?;
            print_json(&engine.category(&category, &page_request(paging)?)?)
        }
        Commands::Random {
            category,
            params,
            seed,
        } => {
            let filter = category_filter(engine, category.as_deref(), params)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            match engine.random(&mut rng, filter.as_ref()) {
                Some(planet) => print_json(planet),
                None => anyhow::bail!("No planets match"),
            }
        }
        Commands::Stats { category, params } => {
            let filter = category_filter(engine, category.as_deref(), params)?;
            print_json(&engine.statistics(filter.as_ref()))
        }
        Commands::Series { category, params } => {
            let filter = category_filter(engine, category.as_deref(), params)?;
            print_json(&engine.series(filter.as_ref()))
        }
    }
}
