use std::sync::Arc;

use quiz_core::model::{
    QuestionCount, QuizRequest, QuizSelection, SlotOutcome, SlotReport, StageRequest, StageSlot,
};
use storage::repository::QuizRepository;

use crate::error::QuizServiceError;

/// Upper bound applied to each slot's count when none is configured.
pub const DEFAULT_MAX_COUNT: QuestionCount = QuestionCount::new(100);

/// Turns a `/quiz` request into per-slot question lists.
#[derive(Clone)]
pub struct QuizService {
    quiz: Arc<dyn QuizRepository>,
    max_count: QuestionCount,
}

impl QuizService {
    #[must_use]
    pub fn new(quiz: Arc<dyn QuizRepository>, max_count: QuestionCount) -> Self {
        Self { quiz, max_count }
    }

    #[must_use]
    pub fn max_count(&self) -> QuestionCount {
        self.max_count
    }

    /// Resolve every slot of `request`, in slot order.
    ///
    /// Malformed slots are logged and reported as `SlotOutcome::Skipped`;
    /// they never fail the selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on the first storage failure. No
    /// partial selection is returned in that case.
    pub async fn select(&self, request: &QuizRequest) -> Result<QuizSelection, QuizServiceError> {
        let mut reports = Vec::with_capacity(StageSlot::ALL.len());
        for slot in StageSlot::ALL {
            let outcome = match request.parse_slot(slot) {
                None => SlotOutcome::Absent,
                Some(Err(err)) => {
                    tracing::warn!(
                        slot = %slot,
                        raw = ?request.raw(slot),
                        error = %err,
                        "skipping malformed quiz slot"
                    );
                    SlotOutcome::skipped(err.to_string())
                }
                Some(Ok(stage_request)) => self.load(slot, stage_request).await?,
            };
            reports.push(SlotReport { slot, outcome });
        }
        Ok(QuizSelection::new(reports))
    }

    async fn load(
        &self,
        slot: StageSlot,
        request: StageRequest,
    ) -> Result<SlotOutcome, QuizServiceError> {
        let (request, clamped) = request.clamped(self.max_count);
        if clamped {
            tracing::info!(
                slot = %slot,
                max = self.max_count.value(),
                "quiz slot count capped"
            );
        }
        if request.count().value() == 0 {
            return Ok(SlotOutcome::loaded(request, Vec::new()));
        }

        let questions = self
            .quiz
            .random_questions(request.stage(), request.count())
            .await?;
        tracing::debug!(
            slot = %slot,
            stage = request.stage().value(),
            requested = request.count().value(),
            returned = questions.len(),
            "quiz slot loaded"
        );
        Ok(SlotOutcome::loaded(request, questions))
    }
}
