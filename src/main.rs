use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use wordvault::config::AppConfig;
use wordvault::core::cache::TermCache;
use wordvault::core::dictionary::Dictionary;
use wordvault::core::morph::VerbFormIndex;
use wordvault::core::normalize::default_chain;
use wordvault::core::resolve::TermResolver;
use wordvault::core::spell::SpellCorrector;
use wordvault::server::rate_limit::RateLimiter;
use wordvault::server::{self, AppState};
use wordvault::storage::SqliteStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    let _log_guard = wordvault::logging::init(&config.logging);
    info!("wordvault v{} starting", wordvault::VERSION);

    let data_dir = config.data_dir();
    let storage = Arc::new(
        SqliteStorage::open(&data_dir, &Dictionary::ALL)
            .await
            .context("opening dictionary databases")?,
    );
    let dictionaries = storage.available();
    if dictionaries.is_empty() {
        warn!(data_dir = %data_dir.display(), "No dictionary databases found");
    }

    let verb_path = config.resolve_path(&config.data.verb_table);
    let verbs = Arc::new(match VerbFormIndex::load(&verb_path) {
        Ok(index) => index,
        Err(e) => {
            warn!(error = %e, "Verb form table unavailable, morphology lookups disabled");
            VerbFormIndex::default()
        }
    });

    let corrector = Arc::new(SpellCorrector::from_dictionary(
        &config.resolve_path(&config.data.spelling_dictionary),
    ));

    let cache = if config.data.cache_enabled {
        let cache = TermCache::build(storage.as_ref(), &dictionaries)
            .await
            .context("building term cache")?;
        Some(Arc::new(cache))
    } else {
        warn!("Term cache disabled, lookups go directly to storage");
        None
    };

    let resolver = TermResolver::new(storage, cache, default_chain(verbs, corrector));

    let state = AppState {
        resolver: Arc::new(resolver),
        limiter: Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        )),
        dictionaries: Arc::new(dictionaries),
    };

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding listener")?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        server::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
