use thiserror::Error;

/// Every failure the crate can signal. All of them are raised synchronously
/// while constructing or combining objects; none are transient.
#[derive(Debug, Error)]
pub enum ChebfunError {
    #[error("an interval requires finite endpoints a < b, got [{0}, {1}]")]
    IntervalValues(f64, f64),

    #[error("a domain requires at least two finite, strictly increasing breakpoints")]
    InvalidDomain,

    #[error("expected {expected} fixed lengths (one per subinterval), got {found}")]
    BadFunLength { expected: usize, found: usize },

    #[error("the supplied intervals leave a gap between {left} and {right}")]
    IntervalGap { left: f64, right: f64 },

    #[error("the supplied intervals overlap between {right} and {left}")]
    IntervalOverlap { left: f64, right: f64 },

    #[error("domains with supports [{0}, {1}] and [{2}, {3}] cannot be united")]
    SupportMismatch(f64, f64, f64, f64),

    #[error("unknown evaluation method '{0}', expected 'bary' or 'clenshaw'")]
    UnknownEvaluationMethod(String),

    #[error("{sub} is not a subinterval of {interval}")]
    NotSubinterval { sub: String, interval: String },

    #[error("the target domain does not refine the breakpoints of the function")]
    NotSubdomain,

    #[error("operands live on different intervals")]
    IntervalMismatch,

    #[error("adaptive construction did not converge with {length} points")]
    NotConverged { length: usize },

    #[error("invalid preferences: {0}")]
    InvalidPreferences(&'static str),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChebfunError>;
