use std::env::VarError;

use derive_new::new;
use thiserror::Error;

use crate::document::NotificationTarget;

pub const TOPIC_ARN_VAR: &str = "TEXTRACT_NOTIFICATION_TOPIC";
pub const ROLE_ARN_VAR: &str = "TEXTRACT_ROLE_ARN";

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    topic_arn: String,
    role_arn: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {0} is empty")]
    EmptyVar(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Builds the config from any variable source; both values are required.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, VarError>,
    ) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).map_err(|_| ConfigError::MissingVar(name))?;

            if value.trim().is_empty() {
                return Err(ConfigError::EmptyVar(name));
            }

            Ok(value)
        };

        Ok(Config::new(required(TOPIC_ARN_VAR)?, required(ROLE_ARN_VAR)?))
    }

    pub fn notification_target(&self) -> NotificationTarget {
        NotificationTarget::new(self.topic_arn.clone(), self.role_arn.clone())
    }
}
