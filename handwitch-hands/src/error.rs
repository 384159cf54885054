use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandError {
    #[error("Can't find hand {0}")]
    UnknownHand(String),

    #[error("Can't find param {0}")]
    UnknownParam(String),

    #[error("Failed to parse param row \"{row}\", split on {fields} args instead of 2")]
    MalformedRow { row: String, fields: usize },

    #[error("Failed to parse value \"{value}\" as {expected}")]
    InvalidValue { value: String, expected: &'static str },

    #[error("Invalid descriptions: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Unknown descriptions file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode json result: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HandError>;
