use thiserror::Error;

use crate::{eval::EvalError, parser::ParseError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Parse error in {label}: {source}")]
    Parse {
        label: String,
        #[source]
        source: ParseError,
    },
    #[error("Eval error in {label}: {source}")]
    Eval {
        label: String,
        #[source]
        source: EvalError,
    },
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

// エラー作成用のヘルパー関数
impl EngineError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        EngineError::Config(message.into())
    }

    /// The label of the template the error belongs to, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            EngineError::Parse { label, .. } | EngineError::Eval { label, .. } => Some(label),
            _ => None,
        }
    }
}
