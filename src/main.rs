use std::error::Error;

use ai_llm_service::telemetry::{self, TARGET_PREFIX};
use tracing::Level;
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Variables may come from the process environment alone, so a missing
    // .env file is not an error. A malformed one is.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err.into());
        }
    }

    let filter = telemetry::env_filter_with_level("info", Level::INFO);

    // Library events are rendered by the telemetry layer; keep them out of
    // the plain application layer to avoid double lines.
    let app_layer = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| {
            !meta.target().starts_with(TARGET_PREFIX)
        }));

    tracing_subscriber::registry()
        .with(filter)
        .with(app_layer)
        .with(telemetry::layer())
        .try_init()?;

    api::start().await?;

    Ok(())
}
