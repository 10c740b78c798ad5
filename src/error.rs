use crate::callable::CallCount;

/// An expectation violation detected by dispatch or verification.
///
/// Violations are reported through the mock's [`Reporter`](crate::Reporter)
/// and never abort the code under test; the degraded result a caller
/// observes instead is a [`Failure`].
#[derive(Clone)]
pub(crate) enum Violation {
    UnexpectedCall {
        name: String,
    },
    OutOfOrder {
        name: String,
        expected_ordinal: usize,
        actual_ordinal: usize,
    },
    ResultMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    UnfulfilledCalls {
        name: String,
        count: CallCount,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCall { name } => {
                write!(f, "unexpected call to {name}")
            }
            Self::OutOfOrder {
                name,
                expected_ordinal,
                actual_ordinal,
            } => {
                write!(
                    f,
                    "out of order call to {name}: got ordinal {actual_ordinal}, want {expected_ordinal}"
                )
            }
            Self::ResultMismatch {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "unexpected result for {name}: expected {expected}, got {actual}"
                )
            }
            Self::UnfulfilledCalls { name, count } => match count.0 {
                0 => write!(f, "failed to make call to {name}"),
                1 => write!(f, "failed to make call to {name}: only got one call"),
                n => write!(f, "failed to make call to {name}: only got {n} calls"),
            },
        }
    }
}

/// The failure value substituted into a failure-capable result slot when a
/// violation prevents real results.
///
/// Carries the same message the violation was reported with, so a caller
/// that only checks its error return still observes what went wrong.
#[derive(Clone, Debug)]
pub struct Failure {
    message: String,
}

impl Failure {
    pub(crate) fn new(violation: &Violation) -> Self {
        Self {
            message: violation.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

impl From<Failure> for String {
    fn from(failure: Failure) -> Self {
        failure.message
    }
}
