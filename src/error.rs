//! Rich diagnostic error types for tweetnet.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for tweetnet.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum TweetNetError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}

/// Result type for top-level operations.
pub type TweetNetResult<T> = std::result::Result<T, TweetNetError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("{what} not set")]
    #[diagnostic(
        code(tweetnet::config::missing_credential),
        help("Set {preferred} (preferred) or {legacy} in the environment or in a .env file.")
    )]
    MissingCredential {
        what: &'static str,
        preferred: &'static str,
        legacy: &'static str,
    },

    #[error("failed to read settings file {path}")]
    #[diagnostic(
        code(tweetnet::config::read),
        help("Check that the file passed to --config exists and is readable.")
    )]
    SettingsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {message}")]
    #[diagnostic(
        code(tweetnet::config::parse),
        help(
            "The settings file must be valid TOML. Known keys: search_base_url, \
             request_timeout_secs, backoff_initial_secs, backoff_max_secs, table."
        )
    )]
    SettingsParse { path: String, message: String },

    #[error("invalid setting {key}: {message}")]
    #[diagnostic(
        code(tweetnet::config::invalid),
        help("Fix the value in the settings file or remove it to use the default.")
    )]
    Invalid { key: &'static str, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(tweetnet::store::io),
        help(
            "A filesystem operation failed. Check that the store directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(tweetnet::store::redb),
        help(
            "The embedded database encountered an error. \
             Check that no other process holds the store file open, \
             or point TWEETNET_STORE at a fresh location."
        )
    )]
    Redb { message: String },

    #[error("serialization error for record {id}: {message}")]
    #[diagnostic(
        code(tweetnet::store::serde),
        help(
            "Failed to encode or decode a stored record. \
             The store was probably written by an incompatible version; \
             re-run `tweetnet fetch` against a fresh store."
        )
    )]
    Serialization { id: String, message: String },

    #[error("unsupported store location: {location}")]
    #[diagnostic(
        code(tweetnet::store::location),
        help("Use a filesystem path or a redb:// URI, e.g. redb:///var/lib/tweetnet/tweets.redb")
    )]
    UnsupportedLocation { location: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Search errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SearchError {
    #[error("search API error {status}: {body}")]
    #[diagnostic(
        code(tweetnet::search::status),
        help(
            "The search endpoint rejected the request. A 401 means the bearer \
             token is wrong; a 400 usually means the query is malformed."
        )
    )]
    Status { status: u16, body: String },

    #[error("transport error contacting {url}: {message}")]
    #[diagnostic(
        code(tweetnet::search::transport),
        help("Check network connectivity and the search_base_url setting.")
    )]
    Transport { url: String, message: String },

    #[error("failed to parse search response: {message}")]
    #[diagnostic(
        code(tweetnet::search::parse),
        help("The endpoint returned a body that is not the expected JSON shape.")
    )]
    Parse { message: String },
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("failed to write {path}")]
    #[diagnostic(
        code(tweetnet::export::write),
        help("Check that the destination directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported image format for {path}")]
    #[diagnostic(
        code(tweetnet::export::image_format),
        help("Graph images are rendered as SVG. Use a path ending in .svg.")
    )]
    UnsupportedImageFormat { path: String },
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
