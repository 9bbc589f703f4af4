use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row identifier of a quiz question.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Integer category used to filter quiz questions.
///
/// Stages are whatever integers the `quiz` table holds, so negative values
/// and zero are representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(i64);

impl Stage {
    /// Creates a new `Stage`
    #[must_use]
    pub const fn new(stage: i64) -> Self {
        Self(stage)
    }

    /// Returns the underlying i64 value
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from '{}'", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(QuestionId::new)
            .map_err(|_| ParseIdError {
                kind: "QuestionId",
                raw: s.to_string(),
            })
    }
}

impl FromStr for Stage {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Stage::new)
            .map_err(|_| ParseIdError {
                kind: "Stage",
                raw: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::new(3).to_string(), "3");
        assert_eq!(Stage::new(-1).to_string(), "-1");
    }

    #[test]
    fn test_stage_from_str_trims_whitespace() {
        let stage: Stage = " 12 ".parse().unwrap();
        assert_eq!(stage, Stage::new(12));
    }

    #[test]
    fn test_stage_from_str_invalid() {
        let err = "two".parse::<Stage>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse Stage from 'two'");
    }

    #[test]
    fn test_question_id_rejects_negative() {
        assert!("-4".parse::<QuestionId>().is_err());
        assert_eq!("4".parse::<QuestionId>().unwrap(), QuestionId::new(4));
    }

    #[test]
    fn test_stage_serializes_as_number() {
        let json = serde_json::to_string(&Stage::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
