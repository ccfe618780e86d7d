use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: image::ImageError },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: image::ImageError },
}
