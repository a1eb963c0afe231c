use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("rule_confidence_threshold must be within [0, 1], got {0}")]
    ConfidenceThreshold(f64),

    #[error("rules_update_interval must be greater than zero")]
    UpdateInterval,

    #[error("remote_rules_url must be set when remote rules are enabled")]
    RemoteUrl,
}
