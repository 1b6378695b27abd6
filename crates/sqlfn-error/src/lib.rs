use thiserror::Error;

/// Primary error type for sqlfn evaluation.
///
/// Every variant is local to a single evaluation. Errors propagate unchanged;
/// a NULL operand is never reported as an error and an error is never turned
/// into NULL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlFnError {
    // === Bind Errors ===
    /// The requested function name is not in the registry.
    #[error("no such function: {name}")]
    UnknownFunction { name: String },

    /// The function exists but not with this many arguments.
    #[error("wrong number of arguments to function {name}(): expected {expected}, got {actual}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// No column with this name exists in the schema.
    #[error("no such column: {name}")]
    NoSuchColumn { name: String },

    // === Type Errors ===
    /// Operand type is incompatible with the declared input type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A row did not have one value per column.
    #[error("table has {expected} columns but {actual} values were supplied")]
    WrongColumnCount { expected: usize, actual: usize },

    // === Runtime Errors ===
    /// Mathematically undefined input for an otherwise type-correct call.
    #[error("{function}: {detail}")]
    DomainError { function: String, detail: String },

    // === Configuration Errors ===
    /// Evaluator configuration could not be parsed.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    // === Internal Errors ===
    /// Internal logic error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse result codes, numbered after the SQLite primary result codes the
/// rest of the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Error = 1,
    Internal = 2,
    Mismatch = 20,
    Misuse = 21,
    Range = 25,
}

impl SqlFnError {
    /// Map this error to its result code.
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownFunction { .. }
            | Self::WrongArgumentCount { .. }
            | Self::NoSuchColumn { .. } => ErrorCode::Error,
            Self::TypeMismatch { .. } | Self::WrongColumnCount { .. } => ErrorCode::Mismatch,
            Self::DomainError { .. } => ErrorCode::Range,
            Self::InvalidConfig { .. } => ErrorCode::Misuse,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the error is raised while binding an expression, before any
    /// row is evaluated.
    pub const fn is_bind_time(&self) -> bool {
        matches!(
            self,
            Self::UnknownFunction { .. }
                | Self::WrongArgumentCount { .. }
                | Self::NoSuchColumn { .. }
        )
    }

    /// Whether the query issuer can fix this by changing the statement or data.
    pub const fn is_user_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Whether the error is scoped to one row, leaving other rows of the same
    /// scan unaffected.
    pub const fn is_row_local(&self) -> bool {
        matches!(self, Self::DomainError { .. })
    }

    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnknownFunction { .. } => Some("Check the function name for typos"),
            Self::WrongArgumentCount { .. } => {
                Some("Check the number of arguments passed to the function")
            }
            Self::TypeMismatch { .. } => Some("Add an explicit CAST to the expected type"),
            Self::DomainError { .. } => Some("Filter out rows outside the function's domain"),
            _ => None,
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.error_code() as i32
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn domain(function: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DomainError {
            function: function.into(),
            detail: detail.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SqlFnError>;
