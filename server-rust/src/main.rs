use clap::Parser;
use dotenvy::dotenv;
use easeai_sdk::LanguageModel;
use easeai_server::{build_model, logging, router, AppState, BoxedError, Config};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    // Load environment variables
    dotenv().ok();

    let config = Config::parse();
    config.validate()?;
    logging::init(config.log_filter.as_deref())?;

    let model = build_model(&config)?;
    tracing::info!(
        provider = model.provider(),
        model = %model.model_id(),
        max_retries = config.max_retries,
        "language model ready"
    );

    let state = AppState::from_config(&config, model);
    let app = router(state, Some(&config.static_dir));

    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|err| Box::new(err) as BoxedError)?;
    let addr = listener.local_addr()?;

    tracing::info!("EaseAi server listening at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| Box::new(err) as BoxedError)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
