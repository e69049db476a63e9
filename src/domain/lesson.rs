use serde::{Deserialize, Serialize};

/// Difficulty level of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
  #[serde(rename = "BEGINNER")]
  Beginner,
  #[serde(rename = "INTERMEDIATE")]
  Intermediate,
  #[serde(rename = "ADVANCED")]
  Advanced,
  #[serde(rename = "EXPERT")]
  Expert,
}

impl Level {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "BEGINNER" => Some(Self::Beginner),
      "INTERMEDIATE" => Some(Self::Intermediate),
      "ADVANCED" => Some(Self::Advanced),
      "EXPERT" => Some(Self::Expert),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Beginner => "BEGINNER",
      Self::Intermediate => "INTERMEDIATE",
      Self::Advanced => "ADVANCED",
      Self::Expert => "EXPERT",
    }
  }
}

/// Exercise kind. Stored as raw text in the catalog so an unknown kind is
/// caught at grading time instead of being silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseType {
  #[serde(rename = "multipleChoice")]
  MultipleChoice,
  #[serde(rename = "text")]
  Text,
  #[serde(rename = "fillInTheBlanks")]
  FillInTheBlanks,
}

impl ExerciseType {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "multipleChoice" => Some(Self::MultipleChoice),
      "text" => Some(Self::Text),
      "fillInTheBlanks" => Some(Self::FillInTheBlanks),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multipleChoice",
      Self::Text => "text",
      Self::FillInTheBlanks => "fillInTheBlanks",
    }
  }
}

/// A single gradable question belonging to a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  pub id: i64,
  pub lesson_id: i64,
  /// Position within the lesson's ordered exercise list
  pub position: i64,
  /// Raw exercise kind ("multipleChoice", "text", "fillInTheBlanks")
  #[serde(rename = "type")]
  pub kind: String,
  pub question: String,
  /// Present only for multiple choice
  pub options: Vec<String>,
  /// Accepted answer strings; free-text kinds only check the first
  #[serde(rename = "correctAnswer")]
  pub correct_answers: Vec<String>,
  /// Remediation text shown on incorrect answers
  pub explanation: Option<String>,
}

impl Exercise {
  pub fn exercise_type(&self) -> Option<ExerciseType> {
    ExerciseType::from_str(&self.kind)
  }
}

/// An ordered collection of exercises, scoped to one language and level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  pub id: i64,
  pub title: String,
  pub description: Option<String>,
  pub language_id: i64,
  pub level: Level,
  /// Ordering index within the level
  pub order: i64,
  pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
  pub id: i64,
  /// Machine name, unique and lowercase ("spanish")
  pub name: String,
  pub display_name: String,
  pub icon_url: Option<String>,
  pub description: Option<String>,
}
