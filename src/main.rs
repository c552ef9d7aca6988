//! Command-line client for the media monitoring API.
//!
//! Reads go through the query cache, writes through the catalog's mutations,
//! and `watch` keeps polling subscriptions open until Ctrl-C.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use mediawatch::api::types::{Frequency, ScrapingHistory, ScrapingSchedule, Stats};
use mediawatch::prelude::*;
use mediawatch::subscription::http::NotificationLevel;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mediawatch")]
#[command(about = "Query and drive the media monitoring backend")]
#[command(version)]
struct Cli {
    /// Base URL of the monitoring API
    #[arg(long, env = "MEDIAWATCH_API_URL", global = true)]
    api_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "MEDIAWATCH_API_TIMEOUT_MS", global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend and its database are up
    Health,

    /// Headline numbers for a period
    Stats {
        #[arg(long)]
        days: Option<u32>,
    },

    /// List the monitored media
    Medias,

    /// List articles
    Articles {
        #[arg(long)]
        media_id: Option<u32>,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Media ranked by engagement
    Ranking {
        #[arg(long)]
        days: Option<u32>,
    },

    /// Audience figures per platform
    Audience {
        #[arg(value_enum)]
        platform: Platform,
        #[arg(long)]
        days: Option<u32>,
    },

    /// Media without recent activity
    Inactive {
        /// Days without activity before a media counts as inactive
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Start a scraping run
    Scrape {
        /// Scrape every registered media
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        all: bool,
        /// Scrape the single media at this URL
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        fb_posts: Option<u32>,
        #[arg(long)]
        tweets: Option<u32>,
        #[arg(long)]
        skip_facebook: bool,
        #[arg(long)]
        skip_twitter: bool,
    },

    /// Inspect or change the automatic scraping schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Past and running scraping tasks
    History {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Follow the scraping history and stats until Ctrl-C
    Watch {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    Show,
    Enable,
    Disable,
    Set {
        #[arg(long)]
        frequency: Frequency,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        fb_posts: Option<u32>,
        #[arg(long)]
        tweets: Option<u32>,
    },
    Delete,
}

#[derive(Clone, Copy, ValueEnum)]
enum Platform {
    Web,
    Facebook,
    Twitter,
    Global,
}

#[derive(Debug)]
enum Event {
    History(QueryResult<ScrapingHistory>),
    Stats(QueryResult<Stats>),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mediawatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ApiConfig::default();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(millis) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(millis));
    }
    tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "configuration loaded");

    let catalog = Catalog::new(ApiClient::new(config), QueryClient::new());
    run(&catalog, cli.command).await
}

async fn run(catalog: &Catalog, command: Commands) -> Result<()> {
    let api = catalog.api();

    match command {
        Commands::Health => print(&catalog.health().fetch().await?),
        Commands::Stats { days } => print(&catalog.stats(days).fetch().await?),
        Commands::Medias => print(&catalog.medias().fetch().await?),
        Commands::Articles {
            media_id,
            days,
            limit,
        } => {
            let params = ArticleParams {
                media_id,
                days,
                limit,
            };
            print(&catalog.articles(params).fetch().await?)
        }
        Commands::Ranking { days } => print(&catalog.ranking(days).fetch().await?),
        Commands::Audience { platform, days } => match platform {
            Platform::Web => print(&api.audience().get_web(days).await.into_result()?),
            Platform::Facebook => print(&api.audience().get_facebook(days).await.into_result()?),
            Platform::Twitter => print(&api.audience().get_twitter(days).await.into_result()?),
            Platform::Global => print(&catalog.global_audience(days).fetch().await?),
        },
        Commands::Inactive { threshold } => print(&api.audience().get_inactive(threshold).await.into_result()?),
        Commands::Scrape {
            all,
            url,
            days,
            fb_posts,
            tweets,
            skip_facebook,
            skip_twitter,
        } => {
            let options = ScrapeOptions {
                days,
                fb_posts,
                tweets,
                skip_facebook: skip_facebook.then_some(true),
                skip_twitter: skip_twitter.then_some(true),
            };
            let response = match url {
                Some(url) if !all => {
                    mutate(catalog, &catalog.scrape_media(), ScrapeMedia { url, options }).await?
                }
                _ => mutate(catalog, &catalog.scrape_all(), options).await?,
            };
            print(&response)
        }
        Commands::Schedule { action } => schedule(catalog, action).await,
        Commands::History { limit, offset } => {
            let params = HistoryParams { limit, offset };
            print(&catalog.scraping_history(params).fetch().await?)
        }
        Commands::Watch { limit } => watch(catalog, limit).await,
    }
}

async fn schedule(catalog: &Catalog, action: ScheduleAction) -> Result<()> {
    match action {
        ScheduleAction::Show => print(&catalog.scraping_schedule().fetch().await?),
        ScheduleAction::Enable => print(&mutate(catalog, &catalog.toggle_schedule(), true).await?),
        ScheduleAction::Disable => print(&mutate(catalog, &catalog.toggle_schedule(), false).await?),
        ScheduleAction::Set {
            frequency,
            days,
            fb_posts,
            tweets,
        } => {
            let current = match catalog.scraping_schedule().fetch().await {
                Ok(current) => current,
                Err(error) => {
                    tracing::warn!(%error, "could not read the current schedule, starting from defaults");
                    ScrapingSchedule::default()
                }
            };
            let schedule = ScrapingSchedule {
                enabled: true,
                frequency,
                days: days.or(current.days),
                fb_posts: fb_posts.or(current.fb_posts),
                tweets: tweets.or(current.tweets),
                ..current
            };
            print(&mutate(catalog, &catalog.update_schedule(), schedule).await?)
        }
        ScheduleAction::Delete => print(&mutate(catalog, &catalog.delete_schedule(), ()).await?),
    }
}

/// Runs a mutation and logs the notifications it published.
async fn mutate<I, O>(catalog: &Catalog, mutation: &Mutation<I, O>, input: I) -> Result<O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    let mut notifications = catalog.client().notifications();
    let result = mutation.mutate(catalog.client(), input).await;
    report(&mut notifications);
    result.wrap_err_with(|| format!("{} failed", mutation.name()))
}

fn report(notifications: &mut broadcast::Receiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        match notification.level {
            NotificationLevel::Success => tracing::info!(%notification),
            NotificationLevel::Error => tracing::warn!(%notification),
        }
    }
}

async fn watch(catalog: &Catalog, limit: u32) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut manager = SubscriptionManager::new(tx);
    let params = HistoryParams {
        limit: Some(limit),
        offset: None,
    };

    manager.update(vec![
        Subscription::new(catalog.scraping_history(params)).map(Event::History),
        Subscription::new(catalog.stats(None)).map(Event::Stats),
    ]);
    tracing::info!(subscriptions = manager.len(), "watching, press Ctrl-C to stop");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.wrap_err("failed to listen for Ctrl-C")?;
                break;
            }
            event = rx.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
        }
    }

    manager.shutdown().await;
    catalog.client().clear();
    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::History(result) => match (&result.state, result.data()) {
            (_, Some(history)) => {
                let running = history
                    .tasks
                    .iter()
                    .filter(|task| task.status == mediawatch::api::types::TaskStatus::Running)
                    .count();
                tracing::info!(total = history.total, running, refreshing = result.is_fetching, "scraping history");
            }
            (QueryState::Error(error), _) => tracing::warn!(%error, "scraping history unavailable"),
            (state, None) => tracing::debug!(state = state.status(), "scraping history"),
        },
        Event::Stats(result) => match (&result.state, result.data()) {
            (_, Some(stats)) => tracing::info!(
                medias = stats.total_medias,
                articles = stats.total_articles,
                period_days = stats.period_days,
                "stats"
            ),
            (QueryState::Error(error), _) => tracing::warn!(%error, "stats unavailable"),
            (state, None) => tracing::debug!(state = state.status(), "stats"),
        },
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
