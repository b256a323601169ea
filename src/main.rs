//! Line-oriented shell around the shopfront engine.
//!
//! Reads one command per line from stdin, turns it into an intent on the
//! [`CatalogStore`], waits for the worker to go idle, and prints the resulting
//! catalog view.
//!
//! # Startup
//!
//! 1. **Config**: `$SHOPFRONT_CONFIG` or the platform config file, then
//!    `SHOPFRONT_*` environment overrides
//! 2. **Tracing**: file-based OTLP export into the data directory
//! 3. **Engine**: HTTP catalog, JSON file store, worker thread, favorites hydration
//!
//! # Commands
//!
//! - `load`: Initial load (only from idle)
//! - `next`: Next page
//! - `refresh`: Reload the current scope
//! - `search <query>`: Search; an empty query returns to the previous scope
//! - `category <slug>` / `category all`: Switch category
//! - `sort <none|price-asc|price-desc|rating-desc>`: Local sort
//! - `clear`: Reset category, sort and search
//! - `categories`: Fetch and list categories
//! - `fav <id>`: Toggle a favorite
//! - `favs`: List loaded favorites
//! - `open <id>` / `close`: Product detail
//! - `clear-cache`: Drop the offline snapshot
//! - `quit`

use shopfront::observability::init_tracing;
use shopfront::worker::WorkerHandle;
use shopfront::{initialize, AppState, CatalogStore, Category, Config, LoadStatus, Result, SortOption};
use std::io::{self, BufRead, Write};
use std::time::Duration;

const TITLE_WIDTH: usize = 40;

enum Command {
    Load,
    Next,
    Refresh,
    Search(String),
    Category(Option<String>),
    Sort(SortOption),
    Clear,
    Categories,
    Favorite(u64),
    Favorites,
    Open(u64),
    Close,
    ClearCache,
    Help,
    Quit,
}

fn parse(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let id = || rest.parse::<u64>().map_err(|_| format!("not a product id: {rest:?}"));

    match word {
        "load" => Ok(Command::Load),
        "next" => Ok(Command::Next),
        "refresh" => Ok(Command::Refresh),
        "search" => Ok(Command::Search(rest.to_string())),
        "category" if rest.is_empty() || rest == "all" => Ok(Command::Category(None)),
        "category" => Ok(Command::Category(Some(rest.to_string()))),
        "sort" => rest
            .parse::<SortOption>()
            .map(Command::Sort)
            .map_err(|e| e.to_string()),
        "clear" => Ok(Command::Clear),
        "categories" => Ok(Command::Categories),
        "fav" => id().map(Command::Favorite),
        "favs" => Ok(Command::Favorites),
        "open" => id().map(Command::Open),
        "close" => Ok(Command::Close),
        "clear-cache" => Ok(Command::ClearCache),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other:?} (try `help`)")),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

fn print_catalog(state: &AppState) {
    let catalog = &state.catalog;
    let scope = catalog.scope();
    let offline = catalog
        .cache_age_millis(chrono::Utc::now().timestamp_millis())
        .map(|age| format!(" (offline, cached {}s ago)", age / 1000))
        .unwrap_or_default();
    println!(
        "[{}] scope={scope} sort={} loaded={}/{} more={}{offline}",
        catalog.status,
        catalog.sort_option,
        catalog.products.len(),
        catalog.total,
        catalog.can_load_more(),
    );
    if let Some(error) = &catalog.error {
        println!("error: {error}");
    }
    for product in state.display_products() {
        let star = if state.is_favorite(product.id) { '*' } else { ' ' };
        println!(
            "{star}{:>5}  {:<width$}  {:>9.2}  {:>4.1}  {}",
            product.id,
            truncate(&product.title, TITLE_WIDTH),
            product.price,
            product.rating,
            product.category,
            width = TITLE_WIDTH,
        );
    }
}

fn print_detail(state: &AppState) {
    let detail = &state.detail;
    match (&detail.product, detail.status) {
        (_, LoadStatus::Failed) => {
            println!("error: {}", detail.error.as_deref().unwrap_or("unknown error"));
        }
        (Some(product), status) => {
            println!("[{status}] #{} {}", product.id, product.title);
            println!("  {}", product.description);
            println!(
                "  price {:.2} (-{:.1}% = {:.2}), rating {:.1}, stock {}, brand {}",
                product.price,
                product.discount_percentage,
                product.discounted_price(),
                product.rating,
                product.stock,
                product.brand,
            );
        }
        (None, status) => println!("[{status}] no product"),
    }
}

fn print_categories(state: &AppState) {
    let catalog = &state.catalog;
    if let Some(error) = &catalog.categories_error {
        println!("error: {error}");
    }
    for category in &catalog.categories {
        println!("{:<28} {}", category.slug, category.name);
    }
}

fn print_help() {
    println!("commands: load, next, refresh, search <q>, category <slug>|all,");
    println!("          sort <none|price-asc|price-desc|rating-desc>, clear, categories,");
    println!("          fav <id>, favs, open <id>, close, clear-cache, quit");
}

/// Runs one command. Returns false when the shell should exit.
fn run(store: &mut CatalogStore<WorkerHandle>, command: Command, wait: Duration) -> Result<bool> {
    match command {
        Command::Load => store.request_initial_load()?,
        Command::Next => store.request_next_page()?,
        Command::Refresh => store.request_refresh()?,
        Command::Search(query) => store.search(query)?,
        Command::Category(slug) => store.set_category(slug.map(Category::from_slug))?,
        Command::Sort(sort) => store.set_sort(sort)?,
        Command::Clear => store.clear_filters()?,
        Command::Categories => {
            store.load_categories()?;
            store.wait_idle(wait)?;
            print_categories(store.state());
            return Ok(true);
        }
        Command::Favorite(id) => {
            let now = store.toggle_favorite(id)?;
            println!("{id} {}", if now { "added to favorites" } else { "removed from favorites" });
        }
        Command::Favorites => {
            let state = store.state();
            println!("{} favorite(s)", state.favorites.len());
            for product in state.favorite_products() {
                println!("*{:>5}  {}", product.id, product.title);
            }
            return Ok(true);
        }
        Command::Open(id) => {
            store.open_product(id)?;
            store.wait_idle(wait)?;
            print_detail(store.state());
            return Ok(true);
        }
        Command::Close => {
            store.close_product()?;
            return Ok(true);
        }
        Command::ClearCache => store.clear_cache()?,
        Command::Help => {
            print_help();
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }

    store.wait_idle(wait)?;
    print_catalog(store.state());
    Ok(true)
}

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("shopfront: {e}");
            std::process::exit(2);
        }
    };

    let provider = init_tracing(&config);
    let span = tracing::debug_span!("shell");
    let _guard = span.enter();

    let mut store = match initialize(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize");
            eprintln!("shopfront: {e}");
            std::process::exit(1);
        }
    };

    store.subscribe(|state: &AppState| {
        tracing::debug!(
            status = %state.catalog.status,
            products = state.catalog.products.len(),
            favorites = state.favorites.len(),
            "state changed"
        );
    });

    let wait = config.request_timeout() * 2;
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match run(&mut store, command, wait) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::warn!(error = %e, "command failed");
                println!("error: {e}");
            }
        }
    }

    if let Err(e) = store.into_port().shutdown() {
        tracing::warn!(error = %e, "worker shutdown failed");
    }
    if let Some(provider) = provider {
        let _ = provider.shutdown();
    }
}
