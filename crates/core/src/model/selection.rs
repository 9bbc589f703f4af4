use serde::Serialize;

use crate::model::ids::Stage;
use crate::model::question::QuizQuestion;
use crate::model::stage::{QuestionCount, StageRequest, StageSlot};

/// What happened to one slot of a quiz request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotOutcome {
    /// The slot was not part of the request.
    Absent,
    /// The slot was supplied but could not be parsed.
    Skipped { reason: String },
    /// Questions were fetched for the slot.
    Loaded {
        stage: Stage,
        count: QuestionCount,
        questions: Vec<QuizQuestion>,
    },
}

impl SlotOutcome {
    #[must_use]
    pub fn loaded(request: StageRequest, questions: Vec<QuizQuestion>) -> Self {
        Self::Loaded {
            stage: request.stage(),
            count: request.count(),
            questions,
        }
    }

    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn questions(&self) -> Option<&[QuizQuestion]> {
        match self {
            Self::Loaded { questions, .. } => Some(questions),
            Self::Absent | Self::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotReport {
    pub slot: StageSlot,
    #[serde(flatten)]
    pub outcome: SlotOutcome,
}

/// Per-slot results of one quiz request, always in slot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuizSelection {
    reports: Vec<SlotReport>,
}

impl QuizSelection {
    /// Build a selection, ordering reports by slot.
    #[must_use]
    pub fn new(mut reports: Vec<SlotReport>) -> Self {
        reports.sort_by_key(|r| StageSlot::ALL.iter().position(|s| *s == r.slot));
        Self { reports }
    }

    #[must_use]
    pub fn reports(&self) -> &[SlotReport] {
        &self.reports
    }

    #[must_use]
    pub fn outcome(&self, slot: StageSlot) -> Option<&SlotOutcome> {
        self.reports
            .iter()
            .find(|r| r.slot == slot)
            .map(|r| &r.outcome)
    }

    /// Number of slots that were supplied but skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, SlotOutcome::Skipped { .. }))
            .count()
    }

    /// Question lists of the loaded slots only, in slot order.
    ///
    /// Absent and skipped slots leave no entry, so positions do not line up
    /// with slot names once a slot is dropped.
    #[must_use]
    pub fn compact(self) -> Vec<Vec<QuizQuestion>> {
        self.reports
            .into_iter()
            .filter_map(|r| match r.outcome {
                SlotOutcome::Loaded { questions, .. } => Some(questions),
                SlotOutcome::Absent | SlotOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(stage: i64) -> QuizQuestion {
        let serde_json::Value::Object(map) = json!({ "stage": stage, "question": "Q" }) else {
            unreachable!()
        };
        QuizQuestion::from_columns(map).unwrap()
    }

    fn sample() -> QuizSelection {
        QuizSelection::new(vec![
            SlotReport {
                slot: StageSlot::Third,
                outcome: SlotOutcome::loaded(
                    StageRequest::new(Stage::new(3), QuestionCount::new(1)),
                    vec![question(3)],
                ),
            },
            SlotReport {
                slot: StageSlot::First,
                outcome: SlotOutcome::loaded(
                    StageRequest::new(Stage::new(1), QuestionCount::new(2)),
                    vec![question(1), question(1)],
                ),
            },
            SlotReport {
                slot: StageSlot::Second,
                outcome: SlotOutcome::skipped("stage is not an integer: 'x'"),
            },
        ])
    }

    #[test]
    fn orders_reports_by_slot() {
        let selection = sample();
        let slots: Vec<_> = selection.reports().iter().map(|r| r.slot).collect();
        assert_eq!(slots, StageSlot::ALL);
        assert_eq!(selection.skipped_count(), 1);
    }

    #[test]
    fn compact_drops_skipped_slots() {
        let compact = sample().compact();
        assert_eq!(compact.len(), 2);
        assert_eq!(compact[0].len(), 2);
        assert_eq!(compact[1][0].stage(), Stage::new(3));
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let selection = sample();
        let value = serde_json::to_value(&selection).unwrap();
        assert_eq!(
            value[1],
            json!({ "slot": "stage2", "status": "skipped", "reason": "stage is not an integer: 'x'" })
        );
        assert_eq!(value[0]["status"], "loaded");
        assert_eq!(value[0]["stage"], 1);
        assert_eq!(value[0]["count"], 2);
        assert_eq!(value[0]["questions"].as_array().map(Vec::len), Some(2));

        let absent = SlotReport {
            slot: StageSlot::First,
            outcome: SlotOutcome::Absent,
        };
        assert_eq!(
            serde_json::to_value(&absent).unwrap(),
            json!({ "slot": "stage1", "status": "absent" })
        );
    }
}
