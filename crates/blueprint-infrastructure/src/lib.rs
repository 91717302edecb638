//! Adapters between the Blueprint domain and the local machine: configuration
//! and secret files, image files on disk, and artifact export.

pub mod config;
pub mod exporter;
pub mod local_file;
pub mod paths;

pub use config::{AppConfig, GeminiSecret, SecretConfig};
pub use exporter::ArtifactExporter;
pub use local_file::LocalImageFile;
pub use paths::BlueprintPaths;
