use aws_lambda_events::event::s3::S3EventRecord;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const COMPLETION_MESSAGE: &str = "Textract processing initiation complete!";

/// Location of one stored object named by an S3 event record.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct DocumentObject {
    pub bucket: String,
    pub key: String,
    pub version: Option<String>,
}

/// Where Textract publishes job completion and the role it publishes as.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct NotificationTarget {
    pub topic_arn: String,
    pub role_arn: String,
}

/// S3 notification payload. Records stay raw so one broken record
/// can't fail the whole batch.
#[derive(Debug, Default, Deserialize)]
pub struct RecordBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn completed() -> Self {
        InvocationResult {
            status_code: 200,
            body: COMPLETION_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record is not an S3 event record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record has no bucket name")]
    MissingBucket,
    #[error("record in bucket {bucket} has no object key")]
    MissingKey { bucket: String },
    #[error("object key {key} in bucket {bucket} is not valid url encoding")]
    InvalidKey { bucket: String, key: String },
    #[error("error processing file {key} from bucket {bucket}: {source:#}")]
    Submission {
        bucket: String,
        key: String,
        source: anyhow::Error,
    },
}

impl TryFrom<&S3EventRecord> for DocumentObject {
    type Error = RecordError;

    fn try_from(record: &S3EventRecord) -> Result<Self, Self::Error> {
        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(RecordError::MissingBucket)?;

        let Some(raw_key) = record.s3.object.key.as_deref() else {
            return Err(RecordError::MissingKey { bucket });
        };

        let key = decode_key(raw_key).ok_or_else(|| RecordError::InvalidKey {
            bucket: bucket.clone(),
            key: raw_key.to_string(),
        })?;

        if key.is_empty() {
            return Err(RecordError::MissingKey { bucket });
        }

        Ok(DocumentObject::new(
            bucket,
            key,
            record.s3.object.version_id.clone(),
        ))
    }
}

// S3 notifications form-encode keys: spaces arrive as '+', the rest as %XX.
fn decode_key(raw_key: &str) -> Option<String> {
    urlencoding::decode(&raw_key.replace('+', " "))
        .ok()
        .map(|key| key.into_owned())
}

#[cfg(test)]
mod tests {
    use aws_lambda_events::event::s3::S3EventRecord;
    use serde_json::json;

    use super::{DocumentObject, InvocationResult, RecordError};

    fn record(bucket: Option<&str>, key: Option<&str>) -> S3EventRecord {
        let mut object = json!({ "size": 1024, "eTag": "0123456789abcdef", "sequencer": "0A1B2C3D4E5F678901" });
        if let Some(key) = key {
            object["key"] = json!(key);
        }

        let mut bucket_json = json!({
            "ownerIdentity": { "principalId": "EXAMPLE" },
            "arn": "arn:aws:s3:::bucket"
        });
        if let Some(bucket) = bucket {
            bucket_json["name"] = json!(bucket);
        }

        serde_json::from_value(json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "2024-01-01T00:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "userIdentity": { "principalId": "EXAMPLE" },
            "requestParameters": { "sourceIPAddress": "127.0.0.1" },
            "responseElements": {
                "x-amz-request-id": "EXAMPLE123456789",
                "x-amz-id-2": "EXAMPLE123/abcdefghijklmn"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "textract-trigger",
                "bucket": bucket_json,
                "object": object
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_document_from_record() {
        let document =
            DocumentObject::try_from(&record(Some("bucketA"), Some("doc1.pdf")))
                .unwrap();

        assert_eq!(
            document,
            DocumentObject::new("bucketA".into(), "doc1.pdf".into(), None)
        );
    }

    #[test]
    fn test_document_key_is_decoded() {
        let document = DocumentObject::try_from(&record(
            Some("bucketA"),
            Some("scans/annual+report%282024%29.pdf"),
        ))
        .unwrap();

        assert_eq!(document.key, "scans/annual report(2024).pdf");
    }

    #[test]
    fn test_missing_bucket() {
        let result = DocumentObject::try_from(&record(None, Some("doc1.pdf")));

        assert!(matches!(result, Err(RecordError::MissingBucket)));
    }

    #[test]
    fn test_missing_key() {
        let result = DocumentObject::try_from(&record(Some("bucketA"), None));

        assert!(matches!(
            result,
            Err(RecordError::MissingKey { bucket }) if bucket == "bucketA"
        ));
    }

    #[test]
    fn test_invalid_key_encoding() {
        let result = DocumentObject::try_from(&record(
            Some("bucketA"),
            Some("bad%FF%FE.pdf"),
        ));

        assert!(matches!(
            result,
            Err(RecordError::InvalidKey { bucket, key })
                if bucket == "bucketA" && key == "bad%FF%FE.pdf"
        ));
    }

    #[test]
    fn test_invocation_result_shape() {
        let value = serde_json::to_value(InvocationResult::completed()).unwrap();

        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "body": "Textract processing initiation complete!"
            })
        );
    }
}
