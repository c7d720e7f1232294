//! Error types for todoscanlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning, aggregating or persisting markers
#[derive(Error, Debug)]
pub enum TodoscanError {
    /// No grammar is registered for the file's extension (or bare file name)
    #[error("unsupported file type '{extension}'")]
    UnsupportedFileType { extension: String },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// History file could not be parsed or serialized
    #[error("invalid history file '{path}': {message}")]
    History { path: PathBuf, message: String },

    /// A history timestamp is not RFC 3339
    #[error("invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    /// Not a recognised marker keyword
    #[error("not a marker keyword: {0}")]
    InvalidMarkerKind(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Git operation error
    #[error("git error: {0}")]
    GitError(String),
}
