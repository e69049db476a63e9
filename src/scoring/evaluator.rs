//! Answer evaluation.
//!
//! Grading is case- and whitespace-insensitive on both sides. Multiple choice
//! accepts any of the stored answers; free-text kinds (`text`,
//! `fillInTheBlanks`) only check the first accepted answer - multiple
//! acceptable free-text answers are not supported.

use crate::domain::{Exercise, ExerciseType};

use super::UnsupportedExerciseType;

/// Result of grading one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
  pub is_correct: bool,
  /// Stored explanation when the exercise has one, otherwise a fallback:
  /// a generic affirmation on correct, the accepted answers on incorrect
  pub explanation: String,
}

/// Normalize for comparison: trim surrounding whitespace, fold case.
fn normalize(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Grade `submitted` against an exercise. Pure; no side effects.
pub fn evaluate(
  exercise: &Exercise,
  submitted: &str,
) -> Result<Evaluation, UnsupportedExerciseType> {
  let kind = exercise
    .exercise_type()
    .ok_or_else(|| UnsupportedExerciseType(exercise.kind.clone()))?;

  let given = normalize(submitted);
  let is_correct = match kind {
    ExerciseType::MultipleChoice => exercise
      .correct_answers
      .iter()
      .any(|accepted| normalize(accepted) == given),
    // Only the first accepted answer is checked for free-text kinds
    ExerciseType::Text | ExerciseType::FillInTheBlanks => exercise
      .correct_answers
      .first()
      .map(|accepted| normalize(accepted) == given)
      .unwrap_or(false),
  };

  let explanation = match (&exercise.explanation, is_correct) {
    (Some(text), _) if !text.is_empty() => text.clone(),
    (_, true) => "Correct, well done!".to_string(),
    (_, false) => format!("Correct answer: {}", exercise.correct_answers.join(", ")),
  };

  Ok(Evaluation {
    is_correct,
    explanation,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn exercise(kind: &str, answers: &[&str]) -> Exercise {
    Exercise {
      id: 1,
      lesson_id: 1,
      position: 0,
      kind: kind.to_string(),
      question: "Capital of France?".to_string(),
      options: vec!["Paris".to_string(), "Lyon".to_string()],
      correct_answers: answers.iter().map(|s| s.to_string()).collect(),
      explanation: None,
    }
  }

  #[test]
  fn multiple_choice_is_case_and_whitespace_insensitive() {
    let ex = exercise("multipleChoice", &["Paris"]);
    assert!(evaluate(&ex, "paris").unwrap().is_correct);
    assert!(evaluate(&ex, " Paris ").unwrap().is_correct);
    assert!(evaluate(&ex, "PARIS").unwrap().is_correct);
    assert!(!evaluate(&ex, "Lyon").unwrap().is_correct);
  }

  #[test]
  fn multiple_choice_accepts_any_stored_answer() {
    let ex = exercise("multipleChoice", &["Paris", "paris city"]);
    assert!(evaluate(&ex, "paris city").unwrap().is_correct);
  }

  #[test]
  fn text_only_checks_first_accepted_answer() {
    let ex = exercise("text", &["hello", "hi"]);
    assert!(evaluate(&ex, "Hello ").unwrap().is_correct);
    // Second accepted answer is not consulted for free-text kinds
    assert!(!evaluate(&ex, "hi").unwrap().is_correct);
  }

  #[test]
  fn fill_in_the_blanks_behaves_like_text() {
    let ex = exercise("fillInTheBlanks", &["42"]);
    assert!(evaluate(&ex, "42").unwrap().is_correct);
    let eval = evaluate(&ex, "43").unwrap();
    assert!(!eval.is_correct);
    assert!(eval.explanation.contains("42"));
  }

  #[test]
  fn incorrect_fallback_lists_accepted_answers_verbatim() {
    let ex = exercise("multipleChoice", &["Paris", "Lyon"]);
    let eval = evaluate(&ex, "Berlin").unwrap();
    assert!(eval.explanation.contains("Paris, Lyon"));
  }

  #[test]
  fn stored_explanation_wins_over_fallback() {
    let mut ex = exercise("text", &["42"]);
    ex.explanation = Some("The answer to everything.".to_string());
    assert_eq!(
      evaluate(&ex, "41").unwrap().explanation,
      "The answer to everything."
    );
    assert_eq!(
      evaluate(&ex, "42").unwrap().explanation,
      "The answer to everything."
    );
  }

  #[test]
  fn unknown_kind_fails_without_grading() {
    let ex = exercise("matchPairs", &["Paris"]);
    let err = evaluate(&ex, "Paris").unwrap_err();
    assert_eq!(err, UnsupportedExerciseType("matchPairs".to_string()));
  }

  #[test]
  fn empty_answer_set_is_never_correct() {
    let ex = exercise("text", &[]);
    assert!(!evaluate(&ex, "anything").unwrap().is_correct);
  }
}
