use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the coarse classification of this error.
    pub fn class(&self) -> ErrorClass {
        self.kind().class()
    }

    pub fn null_reference(context: impl Into<String>) -> Error {
        ErrorKind::NullReference {
            context: context.into(),
        }
        .into()
    }

    pub fn type_mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Error {
        ErrorKind::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
        .into()
    }

    pub fn arity_mismatch(mode: impl Into<String>, expected: usize, actual: usize) -> Error {
        ErrorKind::ArityMismatch {
            mode: mode.into(),
            expected,
            actual,
        }
        .into()
    }

    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Error {
        ErrorKind::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
        .into()
    }

    pub fn index_out_of_range(index: i64, capacity: usize, width: usize) -> Error {
        ErrorKind::IndexOutOfRange {
            index,
            capacity,
            width,
        }
        .into()
    }

    pub fn misaligned(index: i64, width: usize, origin: usize) -> Error {
        ErrorKind::Misaligned {
            index,
            width,
            origin,
        }
        .into()
    }

    pub fn invalid_descriptor(message: impl Into<String>) -> Error {
        ErrorKind::InvalidDescriptor {
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("null reference: {context}")]
    NullReference { context: String },

    #[error("type mismatch for {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("arity mismatch for {mode}: expected {expected} arguments, got {actual}")]
    ArityMismatch {
        mode: String,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported operation {operation}: {reason}")]
    UnsupportedOperation { operation: String, reason: String },

    #[error("index {index} out of range for capacity {capacity} and element width {width}")]
    IndexOutOfRange {
        index: i64,
        capacity: usize,
        width: usize,
    },

    #[error("misaligned access at index {index} (width {width}, alignment origin {origin})")]
    Misaligned {
        index: i64,
        width: usize,
        origin: usize,
    },

    #[error("invalid access descriptor: {message}")]
    InvalidDescriptor { message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl ErrorKind {
    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorKind::NullReference { .. } => ErrorClass::NullReference,
            ErrorKind::TypeMismatch { .. } => ErrorClass::TypeMismatch,
            ErrorKind::ArityMismatch { .. } => ErrorClass::ArityMismatch,
            ErrorKind::UnsupportedOperation { .. } => ErrorClass::UnsupportedOperation,
            ErrorKind::IndexOutOfRange { .. } => ErrorClass::IndexOutOfRange,
            ErrorKind::Misaligned { .. } => ErrorClass::Misaligned,
            ErrorKind::InvalidDescriptor { .. } => ErrorClass::InvalidDescriptor,
            ErrorKind::InvalidArgument { .. } => ErrorClass::InvalidArgument,
            ErrorKind::Io { .. } => ErrorClass::Io,
        }
    }
}

/// Payload-free classification of an [`ErrorKind`], used where outcomes are
/// compared rather than reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorClass {
    NullReference,
    TypeMismatch,
    ArityMismatch,
    UnsupportedOperation,
    IndexOutOfRange,
    Misaligned,
    InvalidDescriptor,
    InvalidArgument,
    Io,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_class() {
        assert_eq!(
            Error::index_out_of_range(-1, 16, 8).class(),
            ErrorClass::IndexOutOfRange
        );
        assert_eq!(Error::misaligned(1, 8, 0).class(), ErrorClass::Misaligned);
        assert_eq!(
            Error::unsupported("set", "read-only view").class(),
            ErrorClass::UnsupportedOperation
        );
        assert_eq!(
            Error::arity_mismatch("get", 0, 1).class(),
            ErrorClass::ArityMismatch
        );
    }

    #[test]
    fn test_error_display() {
        let e = Error::index_out_of_range(9, 16, 8);
        assert_eq!(
            e.to_string(),
            "index 9 out of range for capacity 16 and element width 8"
        );
        let e = Error::type_mismatch("value", "I64", "I32");
        assert_eq!(e.to_string(), "type mismatch for value: expected I64, got I32");
    }

    #[test]
    fn test_error_into_kind() {
        let e = Error::misaligned(3, 4, 1);
        match e.into_kind() {
            ErrorKind::Misaligned {
                index,
                width,
                origin,
            } => {
                assert_eq!((index, width, origin), (3, 4, 1));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
