use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use tfi_finder::config::AppConfig;
use tfi_finder::models::TrendingEntry;
use tfi_finder::search::{SearchOrchestrator, SearchState};
use tfi_finder::tmdb::{CatalogApi, TmdbClient};
use tfi_finder::trends::TrendTracker;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const RETRY_COMMAND: &str = "/retry";
const TRENDING_COMMAND: &str = "/trending";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_state(state: &SearchState) {
    match state {
        SearchState::Idle => {}
        SearchState::Loading { query } if query.trim().is_empty() => {
            println!("Loading popular Telugu movies...");
        }
        SearchState::Loading { query } => println!("Searching for '{}'...", query),
        SearchState::Success { movies, .. } if movies.is_empty() => {
            println!("No movies found. Try searching for something else.");
        }
        SearchState::Success { query, movies } => {
            if query.trim().is_empty() {
                println!("Popular Movies");
            } else {
                println!("Results for '{}'", query);
            }
            for movie in movies {
                println!(
                    "  {:<40} {:>4} | {}  {}",
                    movie.display_title(),
                    movie.rating_label(),
                    movie.release_year(),
                    movie.poster_url().unwrap_or_default()
                );
            }
        }
        SearchState::Error { .. } => {
            if let Some(message) = state.error_message() {
                println!("{}", message);
            }
            println!("Type {} to reload.", RETRY_COMMAND);
        }
    }
}

fn print_trending(entries: &[TrendingEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("Trending Movies");
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "  {}. {} ({} searches) {}",
            index + 1,
            entry.search_term,
            entry.count,
            entry.poster_url.as_deref().unwrap_or("")
        );
    }
}

async fn render(
    mut states: watch::Receiver<SearchState>,
    mut trending: watch::Receiver<Vec<TrendingEntry>>,
) {
    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    return;
                }
                let state = states.borrow_and_update().clone();
                print_state(&state);
            }
            changed = trending.changed() => {
                if changed.is_err() {
                    return;
                }
                let entries = trending.borrow_and_update().clone();
                print_trending(&entries);
            }
        }
    }
}

async fn handle_line(search: &SearchOrchestrator, line: String) {
    let command = line.trim();
    if command == RETRY_COMMAND {
        search.retry();
    } else if command == TRENDING_COMMAND {
        search.refresh_trending().await;
    } else {
        search.set_query(line);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let config = AppConfig::from_env();
    config.report();

    let catalog: Arc<dyn CatalogApi> = Arc::new(TmdbClient::new(&config.catalog)?);
    let trends = TrendTracker::from_config(&config.trends);
    let search = SearchOrchestrator::new(catalog, trends, config.debounce);

    let renderer = tokio::spawn(render(search.subscribe(), search.subscribe_trending()));
    search.mount();
    println!(
        "Type to search Telugu movies (each line replaces the search box). {} reloads, {} shows trending searches.",
        RETRY_COMMAND, TRENDING_COMMAND
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&search, line).await,
                None => {
                    info!("Input closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received (Ctrl+C)");
                break;
            }
        }
    }

    renderer.abort();
    Ok(())
}
