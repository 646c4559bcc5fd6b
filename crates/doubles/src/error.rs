use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidTargetError {
    #[error("Spy target has no member named {0}")]
    MissingMember(String),
    #[error("Member {member} is not callable as {expected}")]
    NotCallable {
        member: String,
        expected: &'static str,
    },
    #[error("Member {0} is already being spied on")]
    AlreadySpied(String),
}

/// A failed expectation, reported back to the test host rather than panicking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected {subject} {expected}, but {actual}")]
pub struct AssertionFailure {
    subject: String,
    expected: String,
    actual: String,
}

impl AssertionFailure {
    pub(crate) fn new(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Name of the double (or value) the expectation was made against
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }
}
