//! Lesson-progress and scoring state machine.
//!
//! Pure state-transition logic: grading a submitted answer, consuming hearts,
//! awarding points and gating the once-per-day bonus question. Callers own
//! persistence; nothing in this module touches the database.

pub mod daily;
pub mod evaluator;
pub mod progress;

pub use daily::{DailyStatus, daily_status};
pub use evaluator::{Evaluation, evaluate};
pub use progress::{AnswerOutcome, complete_answer};

/// Error raised when the catalog contains an exercise this engine cannot
/// grade. A data integrity fault, surfaced server-side rather than defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedExerciseType(pub String);

impl std::fmt::Display for UnsupportedExerciseType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Unsupported exercise type: {:?}", self.0)
  }
}

impl std::error::Error for UnsupportedExerciseType {}
