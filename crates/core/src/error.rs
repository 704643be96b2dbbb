use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal load-time failures. Per-entry owner-resolution failures never show
/// up here; they degrade to a sentinel owner during the build.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload decoded, but does not have the ncdu export shape.
    #[error("invalid scan output: {0}")]
    Format(String),

    /// The payload could not be read.
    #[error("failed to read scan output {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not valid JSON.
    #[error("failed to decode scan output")]
    Json(#[from] serde_json::Error),
}
