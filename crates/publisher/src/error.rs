//! Publisher error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a source tree or syncing it to a site.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("missing delimiter parsing header")]
    MissingDelimiter,

    #[error("unexpected EOF parsing header")]
    UnexpectedEof,

    #[error("unable to parse header attribute: {0}")]
    BadAttribute(String),

    #[error("missing or empty title attribute")]
    MissingTitle,

    #[error("invalid menu_order: \"{0}\"")]
    InvalidMenuOrder(String),

    /// Attributes other than `title` and `menu_order`, listed sorted.
    #[error("unknown attributes: {0}")]
    UnknownAttributes(String),

    #[error("template stage {stage}: {message}")]
    Template { stage: u8, message: String },

    #[error("slug sanitisation failure: unknown characters: \"{0}\"")]
    UnsafeSlug(String),

    #[error("path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Wraps any failure while processing one markdown file.
    #[error("parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: Box<PublishError>,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The site answered with an unexpected status code.
    #[error("{method} {url} failed: {status} {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The site did not honour the slug we asked for.
    #[error("duplicate slug: requested {requested}, response {response}")]
    DuplicateSlug { requested: String, response: String },

    /// The site renamed an uploaded attachment.
    #[error("duplicate attachment: requested {requested}, response {response}")]
    DuplicateAttachment { requested: String, response: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl PublishError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn template(stage: u8, message: impl Into<String>) -> Self {
        Self::Template {
            stage,
            message: message.into(),
        }
    }

    /// Attach the offending file to an error, unless already attached.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Parse { .. } => self,
            other => Self::Parse {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            PublishError::InvalidMenuOrder("x".into()).to_string(),
            "invalid menu_order: \"x\""
        );
        assert_eq!(
            PublishError::DuplicateSlug {
                requested: "a".into(),
                response: "a-2".into()
            }
            .to_string(),
            "duplicate slug: requested a, response a-2"
        );
    }

    #[test]
    fn in_file_wraps_once() {
        let err = PublishError::MissingTitle.in_file("a.md").in_file("b.md");
        assert_eq!(err.to_string(), "parse a.md: missing or empty title attribute");
    }
}
