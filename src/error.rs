use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while discovering or parsing legacy post files.
///
/// Every variant names the file or directory that caused it, so a batch import
/// can report the failure and move on to the next file.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The file '{}' does not have a valid header", .path.display())]
    MalformedHeader { path: PathBuf },

    #[error("Invalid header line {line_no} in '{}': {line:?}", .path.display())]
    MalformedHeaderLine {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    #[error("Missing required field '{field}' in '{}'", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Unable to parse date {value:?} in '{}'", .path.display())]
    DateParseError { path: PathBuf, value: String },

    #[error("No post file for choice {choice} in '{}'", .posts_dir.display())]
    UnknownChoice { posts_dir: PathBuf, choice: usize },

    #[error("Posts directory '{}' is unavailable: {source}", .path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of the post database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Invalid data in database: {0}")]
    InvalidData(String),
}

/// Outcome of an interactive prompt that did not produce an answer.
#[derive(Error, Debug)]
pub enum PromptError {
    /// The user typed `QUIT` or the input stream ended.
    #[error("Quit requested")]
    Quit,

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
}
