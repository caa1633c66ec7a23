use std::path::PathBuf;
use std::{error, fmt, io};

/// Error type shared by the tile set, the persistence documents and the editor.
#[derive(Debug)]
pub enum EditorError {
    /// File I/O error
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// JSON parse or encode error
    Json {
        /// Document that failed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
    /// Settings file could not be parsed
    Settings {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
    /// The chosen file did not decode to a usable image
    InvalidImage(PathBuf),
    /// Tile width or height outside the supported range
    InvalidTileSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// Tried to remove a terrain the registry does not contain
    TerrainNotFound(String),
    /// Coordinates outside a grid
    OutOfBounds {
        /// Column
        x: i64,
        /// Row
        y: i64,
    },
    /// Well-formed JSON whose content does not describe a valid document
    InvalidDocument {
        /// Document that failed
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            EditorError::Json { path, source } => {
                write!(f, "Failed to parse JSON in {}: {}", path.display(), source)
            }
            EditorError::Settings { path, source } => {
                write!(f, "Failed to parse settings {}: {}", path.display(), source)
            }
            EditorError::InvalidImage(path) => {
                write!(f, "Error opening image {}", path.display())
            }
            EditorError::InvalidTileSize { width, height } => {
                write!(f, "Unsupported tile size {}x{}", width, height)
            }
            EditorError::TerrainNotFound(name) => write!(f, "Terrain '{}' not found", name),
            EditorError::OutOfBounds { x, y } => write!(f, "Cell ({}, {}) is out of bounds", x, y),
            EditorError::InvalidDocument { path, reason } => {
                write!(f, "Invalid document {}: {}", path.display(), reason)
            }
        }
    }
}

impl error::Error for EditorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            EditorError::Io { source, .. } => Some(source),
            EditorError::Json { source, .. } => Some(source),
            EditorError::Settings { source, .. } => Some(source),
            _ => None,
        }
    }
}
