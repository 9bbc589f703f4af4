mod ids;
mod processing;
mod question;
mod selection;
mod sketch;
mod stage;

pub use ids::{ParseIdError, QuestionId, Stage};
pub use processing::ProcessingOutcome;
pub use question::{QuestionError, QuizQuestion, STAGE_COLUMN};
pub use selection::{QuizSelection, SlotOutcome, SlotReport};
pub use sketch::{SketchError, SketchImage};
pub use stage::{QuestionCount, QuizRequest, StageRequest, StageRequestError, StageSlot};
