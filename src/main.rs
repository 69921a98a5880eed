use experiment_engine::config::AppConfig;
use experiment_engine::http::routes::router;
use experiment_engine::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    if cfg.rng_seed.is_some() {
        tracing::warn!("STATS_RNG_SEED is set; bayesian results will be reproducible across calls");
    }

    let app = router(AppState { config: cfg.clone() });

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
