use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions raised while importing a .bvh document.
///
/// None of these are recovered from locally: the first failure aborts the
/// parse, the caller gets expected-vs-found context, and whatever part of
/// the skeleton was already built is dropped with the error.
#[derive(Debug, Error)]
pub enum BvhError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected {expected}, found \"{found}\"")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[error("line {line}: expected {expected}, but \"{found}\" is not a number")]
    InvalidNumber {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[error("unexpected end of file while looking for {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("line {line}: motion data continues past the declared frame count")]
    TrailingTokens { line: usize },

    #[error("scene graph rejected a node request: {0}")]
    Scene(#[from] SceneRejection),
}

/// Returned by a [`JointScene`](crate::scene::JointScene) implementation to
/// refuse a creation or keyframe request.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct SceneRejection {
    pub reason: String,
}

impl SceneRejection {
    pub fn new(reason: impl Into<String>) -> Self {
        SceneRejection {
            reason: reason.into(),
        }
    }
}
