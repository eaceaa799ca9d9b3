use aws_lambda_events::event::s3::S3EventRecord;
use derive_more::Constructor;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::Config;
use crate::document::{
    DocumentObject, InvocationResult, NotificationTarget, RecordBatch,
    RecordError,
};
use crate::textract_client::TextDetector;

#[derive(Debug, Constructor)]
pub struct Submission {
    pub document: DocumentObject,
    pub job_id: Option<String>,
}

pub type RecordOutcome = Result<Submission, RecordError>;

#[derive(Constructor)]
pub struct DocumentSubmitter<T: TextDetector> {
    detector: T,
    config: Config,
}

impl<T: TextDetector> DocumentSubmitter<T> {
    /// Submits every record in order. A failed record is logged and
    /// never stops the ones after it.
    pub async fn process_event(
        &self,
        event: &RecordBatch,
    ) -> Vec<RecordOutcome> {
        let target = self.config.notification_target();
        let mut outcomes = Vec::with_capacity(event.records.len());

        for record in &event.records {
            let span = info_span!(
                "record",
                bucket = record.pointer("/s3/bucket/name").and_then(serde_json::Value::as_str),
                key = record.pointer("/s3/object/key").and_then(serde_json::Value::as_str)
            );

            let outcome = self
                .process_record(record, &target)
                .instrument(span)
                .await;

            outcomes.push(outcome);
        }

        outcomes
    }

    async fn process_record(
        &self,
        record: &Value,
        target: &NotificationTarget,
    ) -> RecordOutcome {
        let document = serde_json::from_value::<S3EventRecord>(record.clone())
            .map_err(RecordError::from)
            .and_then(|record| DocumentObject::try_from(&record))
            .inspect_err(|error| {
                error!(%error, "Skipping malformed record");
            })?;

        match self.detector.start_text_detection(&document, target).await {
            Ok(job_id) => {
                let submission = Submission::new(document, job_id);

                info!(
                    job_id = submission.job_id.as_deref(),
                    "File {} is sent to Textract!",
                    submission.document.key
                );

                Ok(submission)
            }
            Err(source) => {
                let error = RecordError::Submission {
                    bucket: document.bucket,
                    key: document.key,
                    source,
                };

                error!(%error);

                Err(error)
            }
        }
    }
}

pub async fn function_handler<T: TextDetector>(
    event: LambdaEvent<RecordBatch>,
    submitter: &DocumentSubmitter<T>,
) -> Result<InvocationResult, Error> {
    let payload = event.payload;

    if payload.records.is_empty() {
        warn!("No records found in S3 event");
        return Ok(InvocationResult::completed());
    }

    let outcomes = submitter.process_event(&payload).await;
    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();

    // Failures are only visible in the logs; the result stays fixed.
    info!(
        submitted = outcomes.len() - failed,
        failed,
        "Textract submissions finished"
    );

    Ok(InvocationResult::completed())
}
