//! Per-exercise progress transition.
//!
//! `complete_answer` is the single transition applied when a user submits an
//! answer inside a lesson: it grades, consumes a heart on a miss, and awards
//! the fixed point value on a hit. Re-answering a lesson that is already in
//! the completed set grades for feedback only and never re-awards points.

use crate::config;
use crate::domain::Exercise;

use super::{UnsupportedExerciseType, evaluator};

/// Outcome of answering one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub is_correct: bool,
  pub hearts_left: i64,
  pub points_earned: i64,
  pub explanation: String,
  /// True when the enclosing lesson was already completed before this answer
  pub is_completed: bool,
}

/// Apply the answer transition.
///
/// `already_completed` is the membership test against the user's completed
/// lesson set for the enclosing lesson; the caller applies `points_earned`
/// to the user's global score and persists `hearts_left`.
///
/// Hearts never go below zero. Reaching zero ends the attempt on the client
/// side; no completed-lesson state is reset here.
pub fn complete_answer(
  already_completed: bool,
  exercise: &Exercise,
  submitted: &str,
  current_hearts: i64,
) -> Result<AnswerOutcome, UnsupportedExerciseType> {
  let evaluation = evaluator::evaluate(exercise, submitted)?;

  // Idempotence guarantee: a finished lesson never re-awards points,
  // and feedback-only grading does not touch hearts.
  if already_completed {
    return Ok(AnswerOutcome {
      is_correct: evaluation.is_correct,
      hearts_left: current_hearts,
      points_earned: 0,
      explanation: evaluation.explanation,
      is_completed: true,
    });
  }

  let (points_earned, hearts_left) = if evaluation.is_correct {
    (config::POINTS_PER_CORRECT_ANSWER, current_hearts)
  } else {
    (0, (current_hearts - 1).max(0))
  };

  Ok(AnswerOutcome {
    is_correct: evaluation.is_correct,
    hearts_left,
    points_earned,
    explanation: evaluation.explanation,
    is_completed: false,
  })
}
