use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use story_grid::application::{CellLoadCoordinator, Paginator, PaginatorState, ResultsGrid};
use story_grid::domain::entities::TargetSize;
use story_grid::infrastructure::{
    AppConfig, CatalogClient, CliArgs, HttpImageTransport, ImageCache, ImageCrateDecoder,
    StorageManager,
};

/// Number of row slots recycled while walking results.
const VISIBLE_ROWS: usize = 6;
const COVER_WAIT: Duration = Duration::from_secs(20);

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

async fn show_row(cell: &CellLoadCoordinator, index: usize) {
    let mut display = cell.subscribe();
    let finished = tokio::time::timeout(COVER_WAIT, display.wait_for(|d| !d.loading)).await;
    if finished.is_err() {
        warn!(row = index, "Timed out waiting for cover");
    }

    let row = cell.display();
    let cover = row.image.as_ref().map_or_else(
        || "no cover".to_string(),
        |image| {
            let (w, h) = image.display_size();
            format!("cover {}x{} px, shown at {w}x{h}", image.width(), image.height())
        },
    );
    println!("{:>4}. {}", index + 1, row.title);
    println!("      {} | {} | {cover}", row.authors, row.narrators);
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = story_grid::VERSION, query = %config.query, "Starting story-grid");

    let catalog = Arc::new(CatalogClient::new(config.catalog.client_config())?);
    let cache = Arc::new(ImageCache::new(
        config.images.cost_limit,
        Arc::new(HttpImageTransport::new(config.images.timeout())?),
        Arc::new(ImageCrateDecoder::new()),
    ));
    let slot = TargetSize::new(config.images.cover_width, config.images.cover_height);

    let paginator = Paginator::new(catalog, config.query.clone());
    let mut events = paginator.subscribe();
    let mut grid = ResultsGrid::new();
    let mut cells: Vec<CellLoadCoordinator> = (0..VISIBLE_ROWS)
        .map(|_| CellLoadCoordinator::new(cache.clone()))
        .collect();

    let mut pending = Some(paginator.fetch_first_page());
    let mut pages = 0;
    let mut header_shown = false;

    while let Some(fetch) = pending.take() {
        fetch.await?;
        pages += 1;

        let shown = grid.len();
        while let Ok(event) = events.try_recv() {
            grid.handle_event(&event);
        }

        if !header_shown && !paginator.last_query().is_empty() {
            println!("Query: {}", paginator.display_query());
            header_shown = true;
        }

        for index in shown..grid.len() {
            let Some(item) = grid.item_at(index, &paginator) else {
                continue;
            };
            let cell = &mut cells[index % VISIBLE_ROWS];
            cell.reset();
            cell.bind(&item, slot);
            show_row(cell, index).await;

            if paginator.is_last_row(index) && pages < config.pages {
                pending = paginator.fetch_next_page();
            }
        }

        // An empty page with a cursor gives no row to trigger the next fetch.
        if pending.is_none()
            && shown == grid.len()
            && paginator.state() == PaginatorState::FinishedLoading
            && pages < config.pages
        {
            pending = paginator.fetch_next_page();
        }

        match paginator.state() {
            PaginatorState::LoadedAllItems => println!("-- end of results --"),
            PaginatorState::Error(e) => warn!(error = %e, "Stopped paging"),
            _ => {}
        }
    }

    let stats = cache.stats().await;
    info!(rows = grid.len(), "{stats}");
    Ok(())
}
