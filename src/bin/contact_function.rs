use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, service_fn};

use contact_relay::config::Config;
use contact_relay::function::{self, FunctionEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    contact_relay::telemetry::init_json(&config.log_level);

    // Built once per container so warm invocations reuse the database pool.
    let service = Arc::new(contact_relay::build_contact_service(&config)?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<FunctionEvent>| {
        let service = service.clone();
        async move { Ok::<_, Error>(function::handle_contact(&service, event.payload).await) }
    }))
    .await
}
