use anyhow::Context;
use prediction_stub_service::{AppState, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; `LOG_FORMAT=json` switches to structured output
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prediction_stub_service=debug,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()
        .unwrap_or(8000);

    let predicted_price = match std::env::var("STUB_PREDICTED_PRICE") {
        Ok(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("STUB_PREDICTED_PRICE is not a number: {}", raw))?,
        Err(_) => 450000.0,
    };

    let app = create_app(AppState { predicted_price });
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    let addr = listener.local_addr()?;

    info!("Prediction stub service listening on {}", addr);
    info!("Prediction endpoint: POST http://{}/predict", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
