use assistant_proxy::ai::OpenAiAssistantsClient;
use assistant_proxy::api::handler;
use assistant_proxy::core::config::AppConfig;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    assistant_proxy::setup_logging();

    // Cold start fails when OPENAI_API_KEY is absent.
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let client = OpenAiAssistantsClient::new(&config).map_err(|e| {
        error!("Failed to initialize Assistants client: {}", e);
        Error::from(e)
    })?;

    info!(
        base_url = %config.openai_base_url,
        poll_interval_ms = config.poll.poll_interval_ms,
        max_attempts = config.poll.max_attempts,
        "Assistant proxy starting"
    );

    let client = &client;
    let poll = &config.poll;
    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(client, poll, event).await
    }))
    .await
}
