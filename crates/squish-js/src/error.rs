use thiserror::Error;

/// Lexing failures. Positions are byte offsets into the normalized input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unclosed string at position {position}")]
    UnterminatedString { position: usize },

    #[error("unclosed regex pattern at position {position}")]
    UnterminatedRegex { position: usize },

    #[error("unclosed multiline comment at position {position}")]
    UnterminatedBlockComment { position: usize },
}

pub type Result<T> = std::result::Result<T, ScriptError>;
