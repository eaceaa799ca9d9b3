use anyhow::{Context, Result};
use aws_sdk_textract::types::{DocumentLocation, NotificationChannel, S3Object};
#[cfg(test)]
use mockall::automock;

use crate::document::{DocumentObject, NotificationTarget};

#[cfg_attr(test, automock)]
pub trait TextDetector {
    /// Starts an asynchronous text detection job and returns its id, if any.
    async fn start_text_detection(
        &self,
        document: &DocumentObject,
        target: &NotificationTarget,
    ) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct TextractClient {
    client: aws_sdk_textract::Client,
}

impl TextractClient {
    pub fn new(client: aws_sdk_textract::Client) -> Self {
        TextractClient { client }
    }
}

impl TextDetector for TextractClient {
    async fn start_text_detection(
        &self,
        document: &DocumentObject,
        target: &NotificationTarget,
    ) -> Result<Option<String>> {
        let location = DocumentLocation::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&document.bucket)
                    .name(&document.key)
                    .set_version(document.version.clone())
                    .build(),
            )
            .build();

        let channel = NotificationChannel::builder()
            .sns_topic_arn(&target.topic_arn)
            .role_arn(&target.role_arn)
            .build()
            .context("Invalid notification channel")?;

        let output = self
            .client
            .start_document_text_detection()
            .document_location(location)
            .notification_channel(channel)
            .send()
            .await
            .map_err(aws_sdk_textract::Error::from)
            .context("StartDocumentTextDetection failed")?;

        Ok(output.job_id().map(str::to_string))
    }
}
