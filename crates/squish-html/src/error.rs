use squish_js::ScriptError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("inline script: {0}")]
    Script(#[from] ScriptError),
}

pub type Result<T> = std::result::Result<T, MarkupError>;
