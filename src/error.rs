//! Errors raised while resolving construct call sites.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Number of arguments a construct accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn admits(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "exactly 1 argument"),
            Arity::Exactly(n) => write!(f, "exactly {n} arguments"),
            Arity::Between(lo, hi) => write!(f, "{lo} or {hi} arguments"),
            Arity::Any => write!(f, "any number of arguments"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{construct} expects {expected}, got {found}")]
    Arity {
        construct: &'static str,
        expected: Arity,
        found: usize,
    },

    #[error("{construct} cannot be assigned to a variable when the first argument is a function")]
    IllegalBinding { construct: &'static str },

    #[error("{construct} expects {expected} for {slot}, found {found}")]
    Unresolvable {
        construct: &'static str,
        slot: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{construct} does not support spread {what}")]
    Spread {
        construct: &'static str,
        what: &'static str,
    },

    #[error("{construct} must be called as a function, not rendered as an element")]
    NotMarkup { construct: &'static str },

    #[error("{construct} can only be used as a call or element; other references cannot be resolved at build time")]
    StrayReference { construct: &'static str },

    #[error("{construct} selected a branch that does not exist")]
    MissingBranch { construct: &'static str },

    #[error("invalid plugin configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_messages_name_the_construct() {
        let err = Error::Arity {
            construct: "whenProd",
            expected: Arity::Between(1, 2),
            found: 3,
        };
        assert_eq!(err.to_string(), "whenProd expects 1 or 2 arguments, got 3");

        let err = Error::Arity {
            construct: "whenDev",
            expected: Arity::Exactly(2),
            found: 1,
        };
        assert_eq!(err.to_string(), "whenDev expects exactly 2 arguments, got 1");
    }

    #[test]
    fn arity_bounds() {
        assert!(Arity::Between(2, 3).admits(2));
        assert!(Arity::Between(2, 3).admits(3));
        assert!(!Arity::Between(2, 3).admits(4));
        assert!(!Arity::Exactly(1).admits(0));
        assert!(Arity::Any.admits(0));
    }
}
