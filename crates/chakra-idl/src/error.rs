//! IDL compiler errors

use std::path::PathBuf;
use thiserror::Error;

/// Longest fragment of unconsumed source quoted back in a diagnostic
const FRAGMENT_LIMIT: usize = 80;

/// IDL compilation errors
#[derive(Debug, Error)]
pub enum IdlError {
    /// No statement pattern matched at the current cursor
    #[error("no statement matches at: `{fragment}`")]
    GrammarMismatch {
        fragment: String,
    },

    /// Type token without a marshalling rule
    #[error("unsupported type `{ty}` in {context}")]
    UnsupportedType {
        ty: String,
        context: String,
    },

    /// Leftover text that is not an interface block
    #[error("expected an interface block, found: `{fragment}`")]
    UnknownInterfaceBody {
        fragment: String,
    },

    /// Two interfaces flatten to the same symbol name
    #[error("interface `{name}` is declared more than once in this compilation unit")]
    DuplicateInterface {
        name: String,
    },

    /// Two delegates flatten to the same symbol name
    #[error("delegate `{name}` is declared more than once in this compilation unit")]
    DuplicateDelegate {
        name: String,
    },

    /// Reading a source or writing a destination failed
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any of the above, attributed to the file that produced it
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<IdlError>,
    },
}

/// Result type for IDL operations
pub type Result<T> = std::result::Result<T, IdlError>;

impl IdlError {
    pub fn grammar(remaining: &str) -> Self {
        Self::GrammarMismatch {
            fragment: excerpt(remaining),
        }
    }

    pub fn unsupported(ty: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnsupportedType {
            ty: ty.into(),
            context: context.into(),
        }
    }

    pub fn unknown_body(remaining: &str) -> Self {
        Self::UnknownInterfaceBody {
            fragment: excerpt(remaining),
        }
    }

    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateInterface { name: name.into() }
    }

    pub fn duplicate_delegate(name: impl Into<String>) -> Self {
        Self::DuplicateDelegate { name: name.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the offending file to an error. I/O errors already carry a path
    /// and are returned unchanged.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io { .. } | Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The error with any file attribution peeled off
    pub fn root(&self) -> &IdlError {
        match self {
            Self::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

fn excerpt(text: &str) -> String {
    let line = text.trim_start().lines().next().unwrap_or_default().trim_end();
    match line.char_indices().nth(FRAGMENT_LIMIT) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_first_line() {
        let err = IdlError::grammar("  int broken(\nfloat x;");
        assert_eq!(err.to_string(), "no statement matches at: `int broken(`");
    }

    #[test]
    fn test_fragment_is_truncated() {
        let long = "x".repeat(200);
        match IdlError::grammar(&long) {
            IdlError::GrammarMismatch { fragment } => {
                assert_eq!(fragment.len(), FRAGMENT_LIMIT + 3);
                assert!(fragment.ends_with("..."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_in_file_wraps_once() {
        let err = IdlError::unsupported("long", "parameter `x`")
            .in_file("a.idl")
            .in_file("b.idl");
        assert!(err.to_string().starts_with("a.idl: "));
        assert!(matches!(err.root(), IdlError::UnsupportedType { .. }));
    }
}
