/// Failure categories of the analysis pipeline.
///
/// Every category aborts the run; the kind decides the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command-line usage or configuration.
    Usage,
    /// Reading or writing a file failed.
    Io,
    /// A token in an input file is not a valid number.
    Parse,
    /// Rows within one block have differing column counts, or a selection is ambiguous.
    Format,
    /// Tables that must share a shape do not.
    ShapeMismatch,
    /// Not enough data to continue (empty file, empty selection, too few fit points).
    InsufficientData,
    /// The optimizer did not converge.
    FitConvergence,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage | ErrorKind::Io => 2,
            ErrorKind::Parse | ErrorKind::Format | ErrorKind::ShapeMismatch => 3,
            ErrorKind::InsufficientData => 4,
            ErrorKind::FitConvergence => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
