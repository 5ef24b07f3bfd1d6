use std::path::PathBuf;

/// A report file could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("unable to write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize '{}'", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
