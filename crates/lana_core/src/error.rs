use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveErrorCode {
    NotFound,
    NoValue,
    ForbiddenAccess,
    InvalidKind,
    InvalidConversionSource,
    InvalidConversionTarget,
    MalformedHex,
    Overflow,
    InvalidTable,
    Io,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save field currently known at {0}")]
    NotFound(String),

    #[error("save field `{0}` does not currently have a value")]
    NoValue(String),

    #[error("access to reserved field `{0}` is forbidden")]
    ForbiddenAccess(String),

    #[error("invalid field kind `{0}`")]
    InvalidKind(String),

    #[error("invalid conversion source: {0}")]
    InvalidConversionSource(String),

    #[error("invalid conversion target: {0}")]
    InvalidConversionTarget(String),

    #[error("malformed hex data: {0}")]
    MalformedHex(String),

    #[error("value of `{field}` does not fit in {length} bytes (encoded as {encoded})")]
    Overflow {
        field: String,
        length: usize,
        encoded: String,
    },

    #[error("invalid field table: {0}")]
    InvalidTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SaveError {
    pub fn code(&self) -> SaveErrorCode {
        match self {
            Self::NotFound(_) => SaveErrorCode::NotFound,
            Self::NoValue(_) => SaveErrorCode::NoValue,
            Self::ForbiddenAccess(_) => SaveErrorCode::ForbiddenAccess,
            Self::InvalidKind(_) => SaveErrorCode::InvalidKind,
            Self::InvalidConversionSource(_) => SaveErrorCode::InvalidConversionSource,
            Self::InvalidConversionTarget(_) => SaveErrorCode::InvalidConversionTarget,
            Self::MalformedHex(_) => SaveErrorCode::MalformedHex,
            Self::Overflow { .. } => SaveErrorCode::Overflow,
            Self::InvalidTable(_) => SaveErrorCode::InvalidTable,
            Self::Io(_) => SaveErrorCode::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, SaveError>;
