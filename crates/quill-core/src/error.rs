use std::fmt;

/// Machine-readable error codes surfaced alongside [`Error`] values so
/// callers (UI layers, scripts) can branch without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    IsReadOnly,
    Validation,
    VirtualFolderTarget,
    ReservedFolderId,
    Storage,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::IsReadOnly => "E2001",
            Self::Validation => "E2002",
            Self::VirtualFolderTarget => "E2003",
            Self::ReservedFolderId => "E2004",
            Self::Storage => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::IsReadOnly => "Item belongs to a read-only share",
            Self::Validation => "Validation failed",
            Self::VirtualFolderTarget => "Virtual folders cannot be a target",
            Self::ReservedFolderId => "Folder id is reserved",
            Self::Storage => "Storage error",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors produced by the lifecycle and store layers.
///
/// Permission and validation failures are raised synchronously to the
/// immediate caller; a load of a missing item is `Ok(None)`, never an
/// error, so callers can use it to confirm a purge completed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mutation was attempted against a read-only share without a
    /// synchronization-origin change source.
    #[error("cannot modify item in read-only share '{share_id}'")]
    IsReadOnly { share_id: String },

    #[error("{0}")]
    Validation(String),

    /// Notes cannot be filed into a virtual folder (Conflicts, Trash).
    #[error("notes cannot be moved or copied into the {0} folder")]
    VirtualFolderTarget(&'static str),

    /// The id is reserved for a virtual folder and cannot be saved or
    /// deleted through the normal folder paths.
    #[error("folder id '{0}' is reserved")]
    ReservedFolderId(String),

    /// An impossible branch was reached. Never expected to surface in
    /// correct use.
    #[error("invariant violated: {0}")]
    Unreachable(&'static str),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// The stable machine code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::IsReadOnly { .. } => ErrorCode::IsReadOnly,
            Self::Validation(_) => ErrorCode::Validation,
            Self::VirtualFolderTarget(_) => ErrorCode::VirtualFolderTarget,
            Self::ReservedFolderId(_) => ErrorCode::ReservedFolderId,
            Self::Unreachable(_) => ErrorCode::InternalUnexpected,
            Self::Storage(_) => ErrorCode::Storage,
            Self::Internal(_) => ErrorCode::InternalUnexpected,
        }
    }

    /// True when the error is a read-only share violation.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::IsReadOnly { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::{Error, ErrorCode};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::IsReadOnly,
            ErrorCode::Validation,
            ErrorCode::VirtualFolderTarget,
            ErrorCode::ReservedFolderId,
            ErrorCode::Storage,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::IsReadOnly.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn read_only_errors_are_detectable() {
        let err = Error::IsReadOnly {
            share_id: "abc".into(),
        };
        assert!(err.is_read_only());
        assert_eq!(err.error_code(), ErrorCode::IsReadOnly);
        assert!(!Error::Validation("x".into()).is_read_only());
    }
}
