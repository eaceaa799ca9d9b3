#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::path::Path;

use anyhow::Context as _;
use aws_config::BehaviorVersion;
use dotenvy::dotenv;
use lambda_runtime::{Context, Error, LambdaEvent, run, service_fn};
use tracing::info;

use crate::config::Config;
use crate::document::RecordBatch;
use crate::event_handler::{DocumentSubmitter, function_handler};
use crate::textract_client::TextractClient;

mod config;
mod document;
mod event_handler;
mod textract_client;

#[tokio::main]
async fn main() -> Result<(), Error> {
    if cfg!(debug_assertions) {
        dotenv()?;
        color_eyre::install()?;
        tracing_subscriber::fmt().pretty().init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::INFO)
            // disable printing the name of the module in every log line.
            .with_target(false)
            // disabling time is handy because CloudWatch will add the ingestion time.
            .without_time()
            .init();
    }

    let config = Config::from_env()?;

    let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let textract = TextractClient::new(aws_sdk_textract::Client::new(&shared_config));
    let submitter = DocumentSubmitter::new(textract, config);

    if cfg!(debug_assertions) {
        let event_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("event.json");

        let event_json = std::fs::read_to_string(&event_path)
            .with_context(|| event_path.display().to_string())?;

        let event: RecordBatch = serde_json::from_str(event_json.as_str())?;

        let result =
            function_handler(LambdaEvent::new(event, Context::default()), &submitter)
                .await?;

        info!(status_code = result.status_code, body = %result.body, "Local invocation");
    } else {
        run(service_fn(|event| function_handler(event, &submitter))).await?;
    }

    Ok(())
}
