use thiserror::Error;

use crate::types::ParamKind;

#[derive(Error, Debug)]
pub enum GuifyError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid form definition: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unable to infer type for parameter `{param}` of `{function}`")]
    MissingType { param: String, function: String },
    #[error("unknown parameter type `{0}`")]
    UnknownKind(String),
    #[error("default of parameter `{param}` has unsupported type {found}")]
    UnsupportedDefault { param: String, found: String },
    #[error("parameter `{param}` of `{function}` is declared more than once (names are case-insensitive)")]
    DuplicateParameter { param: String, function: String },
    #[error("parameter `{param}` of `{function}` clashes with the reserved configuration key `{key}`")]
    ReservedName {
        param: String,
        function: String,
        key: &'static str,
    },
    #[error("parameter `{param}` expects {expected}, got {found}")]
    TypeMismatch {
        param: String,
        expected: ParamKind,
        found: String,
    },
    #[error("parameter `{param}`: cannot read {text:?} as {expected}")]
    InvalidText {
        param: String,
        expected: ParamKind,
        text: String,
    },
    #[error("configuration document must be a JSON object, got {0}")]
    NotAnObject(String),
    #[error("form is {actual}, expected {expected}")]
    InvalidPhase {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("event loop has been shut down")]
    LoopStopped,
    #[error("`{function}` failed: {message}")]
    Callback { function: String, message: String },
    #[error("window failed: {0}")]
    Gui(#[from] eframe::Error),
}
