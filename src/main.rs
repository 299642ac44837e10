use lstm_forecast::config::Config;
use lstm_forecast::services::Predictor;
use lstm_forecast::{app, logging, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    logging::init_server(&config)?;
    info!("API starting...");

    // Model and scaler are loaded once; a bad artifact aborts startup
    let predictor = match Predictor::from_config(&config) {
        Ok(predictor) => predictor,
        Err(e) => {
            error!("Failed to load model: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Model and scaler loaded (window {}, currency {})",
        predictor.window(),
        predictor.currency()
    );

    let addr = config.bind_addr();
    let state = AppState::new(predictor);
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("lstm-forecast server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
