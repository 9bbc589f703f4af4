#![forbid(unsafe_code)]

pub mod model;

pub use model::{
    ProcessingOutcome, QuestionCount, QuestionError, QuestionId, QuizQuestion, QuizRequest,
    QuizSelection, SketchError, SketchImage, SlotOutcome, SlotReport, Stage, StageRequest,
    StageRequestError, StageSlot,
};
