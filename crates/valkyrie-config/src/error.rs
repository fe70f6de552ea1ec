use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No Valkyrie project found (searched for valkconfig.json from {0} upwards).\n\
        Run this command inside a project created with `valkyrie create`,\n\
        or point VALKYRIE_CONFIG_PATH at the project's valkconfig.json"
    )]
    ProjectNotFound(PathBuf),

    #[error("Invalid settings file {path}: {message}")]
    InvalidSettings { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
