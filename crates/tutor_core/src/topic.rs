//! crates/tutor_core/src/topic.rs
//!
//! The user-supplied topic and the bounds it must satisfy before any
//! request leaves the process.

use std::fmt;

pub const MIN_TOPIC_CHARS: usize = 3;
pub const MAX_TOPIC_CHARS: usize = 100;

/// Rejection reasons for a submitted topic. The messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Please enter a Web3 project or concept.")]
    Empty,
    #[error("Input is too short. Please provide at least 3 characters.")]
    TooShort,
    #[error("Input is too long. Please keep it under 100 characters.")]
    TooLong,
}

/// A trimmed topic whose length is known to be within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery(String);

impl TopicQuery {
    /// Trims `raw` and checks its length in characters.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len == 0 {
            return Err(InputError::Empty);
        }
        if len < MIN_TOPIC_CHARS {
            return Err(InputError::TooShort);
        }
        if len > MAX_TOPIC_CHARS {
            return Err(InputError::TooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TopicQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
