use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, service_fn};

use contact_relay::config;
use contact_relay::cors::CorsPolicy;
use contact_relay::function::{self, FunctionEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let log_level = std::env::var("CONTACT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    contact_relay::telemetry::init_json(&log_level);

    let cors = Arc::new(CorsPolicy::new(config::allowed_origins_from_env()));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<FunctionEvent>| {
        let cors = cors.clone();
        async move { Ok::<_, Error>(function::handle_health(&cors, event.payload)) }
    }))
    .await
}
