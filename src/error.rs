//! Error types for scene import and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable setup failures while importing a scene.
///
/// Per-asset problems (a missing texture, a mesh without normals, a camera
/// whose node is absent) are not errors; they are logged and replaced with
/// defaults.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The scene file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension is not one the importer understands.
    #[error("Unsupported scene format '{0}' (expected .obj or .toml)")]
    UnsupportedFormat(PathBuf),

    /// tobj failed to parse an OBJ file.
    #[error("Failed to load OBJ file '{path}': {message}")]
    ObjLoad {
        /// Path to the OBJ file.
        path: PathBuf,
        /// Error message reported by the OBJ parser.
        message: String,
    },

    /// The TOML scene description is malformed.
    #[error("Failed to parse scene description '{path}': {message}")]
    SceneDescription { path: PathBuf, message: String },

    /// A node refers to a mesh source that is not declared.
    #[error("Node '{node}' references unknown mesh source '{source_name}'")]
    UnknownMeshSource { node: String, source_name: String },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures while reading the viewer configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid window size {width}x{height} in '{path}': both sides must be at least 1")]
    WindowSize {
        path: PathBuf,
        width: usize,
        height: usize,
    },
}

/// Result type alias for scene import operations.
pub type SceneResult<T> = Result<T, SceneError>;
