use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::Stage;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StageRequestError {
    #[error("expected a stage and a count, got {found} value(s)")]
    WrongArity { found: usize },

    #[error("stage is not an integer: '{0}'")]
    InvalidStage(String),

    #[error("count is not an integer: '{0}'")]
    InvalidCount(String),

    #[error("count must not be negative: {0}")]
    NegativeCount(i64),

    #[error("count is too large: {0}")]
    CountTooLarge(i64),
}

//
// ─── SLOTS ─────────────────────────────────────────────────────────────────────
//

/// One of the three fixed query slots of `/quiz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageSlot {
    #[serde(rename = "stage1")]
    First,
    #[serde(rename = "stage2")]
    Second,
    #[serde(rename = "stage3")]
    Third,
}

impl StageSlot {
    pub const ALL: [StageSlot; 3] = [StageSlot::First, StageSlot::Second, StageSlot::Third];

    /// Query parameter name of the slot.
    #[must_use]
    pub fn param(self) -> &'static str {
        match self {
            StageSlot::First => "stage1",
            StageSlot::Second => "stage2",
            StageSlot::Third => "stage3",
        }
    }

    /// Resolve a query key to a slot.
    ///
    /// Bracketed forms (`stage1[]`, `stage1[0]`) map to the same slot.
    #[must_use]
    pub fn from_param(key: &str) -> Option<Self> {
        let base = key.split('[').next().unwrap_or(key);
        Self::ALL.into_iter().find(|slot| slot.param() == base)
    }

    /// Explicit position of a `stage1[1]` style key, if it has one.
    #[must_use]
    pub fn key_position(key: &str) -> Option<usize> {
        let (_, rest) = key.split_once('[')?;
        rest.strip_suffix(']')?.trim().parse().ok()
    }

    fn index(self) -> usize {
        match self {
            StageSlot::First => 0,
            StageSlot::Second => 1,
            StageSlot::Third => 2,
        }
    }
}

impl fmt::Display for StageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

/// How many questions a slot asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionCount(u32);

impl QuestionCount {
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated `(stage, count)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRequest {
    stage: Stage,
    count: QuestionCount,
}

impl StageRequest {
    #[must_use]
    pub fn new(stage: Stage, count: QuestionCount) -> Self {
        Self { stage, count }
    }

    /// Parse the raw values supplied for one slot.
    ///
    /// Accepts a single comma separated value (`"2,5"`) or two separate
    /// values (`["2", "5"]`).
    ///
    /// # Errors
    ///
    /// Returns `StageRequestError` when the values do not form exactly one
    /// integer stage and one non-negative integer count.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, StageRequestError> {
        let parts: Vec<&str> = match values {
            [single] => single.as_ref().split(',').collect(),
            many => many.iter().map(|v| v.as_ref()).collect(),
        };

        let [stage_raw, count_raw] = parts.as_slice() else {
            return Err(StageRequestError::WrongArity { found: parts.len() });
        };

        let stage = stage_raw
            .trim()
            .parse::<i64>()
            .map(Stage::new)
            .map_err(|_| StageRequestError::InvalidStage((*stage_raw).to_string()))?;

        let count = count_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| StageRequestError::InvalidCount((*count_raw).to_string()))?;
        if count < 0 {
            return Err(StageRequestError::NegativeCount(count));
        }
        let count = u32::try_from(count).map_err(|_| StageRequestError::CountTooLarge(count))?;

        Ok(Self::new(stage, QuestionCount::new(count)))
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn count(&self) -> QuestionCount {
        self.count
    }

    /// Returns the request with its count capped at `max`, and whether the
    /// cap was applied.
    #[must_use]
    pub fn clamped(self, max: QuestionCount) -> (Self, bool) {
        if self.count > max {
            (Self::new(self.stage, max), true)
        } else {
            (self, false)
        }
    }
}

/// The raw slot values of one `/quiz` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizRequest {
    slots: [Vec<String>; 3],
}

impl QuizRequest {
    /// Collect slot values from a URL query string (without the leading `?`).
    ///
    /// Keys other than the three slots are ignored. Indexed keys
    /// (`stage1[1]=5&stage1[0]=2`) are ordered by their index; other values
    /// keep their position in the query.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut collected: [Vec<(usize, String)>; 3] = Default::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if let Some(slot) = StageSlot::from_param(&key) {
                let values = &mut collected[slot.index()];
                let position = StageSlot::key_position(&key).unwrap_or(values.len());
                values.push((position, value.into_owned()));
            }
        }

        let mut request = Self::default();
        for (slot, mut values) in request.slots.iter_mut().zip(collected) {
            values.sort_by_key(|(position, _)| *position);
            *slot = values.into_iter().map(|(_, value)| value).collect();
        }
        request
    }

    /// Append raw values to a slot.
    #[must_use]
    pub fn with_slot<I, S>(mut self, slot: StageSlot, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots[slot.index()].extend(values.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn raw(&self, slot: StageSlot) -> &[String] {
        &self.slots[slot.index()]
    }

    /// Parse one slot.
    ///
    /// Returns `None` when the slot was not supplied or only blank values
    /// were given.
    #[must_use]
    pub fn parse_slot(&self, slot: StageSlot) -> Option<Result<StageRequest, StageRequestError>> {
        let values = self.raw(slot);
        if values.iter().all(|v| v.trim().is_empty()) {
            return None;
        }
        Some(StageRequest::parse(values))
    }
}
