use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

use crate::token::Token;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling various errors encountered while
/// reading the repository or writing the `gitlog` reports.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("incorrect format for config file: {0}")]
    ConfigFormat(PathBuf),

    #[error("cannot get current directory")]
    CurrentDir,

    #[error("no git repository found (searched {0})")]
    RepositoryNotFound(String),

    #[error("`git` executable not found")]
    GitNotFound,

    #[error("`git {args}` failed with exit code {code}: {stderr}")]
    Git {
        args: String,
        code: i32,
        stderr: String,
    },

    #[error("malformed commit timestamp {value:?} for commit {hash}")]
    Timestamp { hash: String, value: String },

    #[error("failed to convert date/time to string format")]
    TimeFormat(#[from] time::error::Format),

    #[error("no value for token {0} in the token map")]
    MissingToken(Token),

    #[error("template file not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("failed to render template: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to serialize JSON report")]
    Json(#[from] serde_json::Error),

    #[error("failed to write formats: {}", .0.join(", "))]
    Formats(Vec<String>),

    #[error("fatal I/O error with output file")]
    Io(#[from] std::io::Error),
}
