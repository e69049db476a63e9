//! Daily question gate.
//!
//! At most one reward per server-local calendar day, correct or not.
//! Comparison is day-truncated and not timezone-aware per user; the server's
//! calendar day is the reference (known simplification).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatus {
  pub has_answered_today: bool,
  /// Start of the following calendar day, present when already answered
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_attempt_time: Option<DateTime<Utc>>,
}

/// Compare the day-truncated last-answered date against `today`.
pub fn daily_status(last_answered: Option<NaiveDate>, today: NaiveDate) -> DailyStatus {
  if last_answered == Some(today) {
    DailyStatus {
      has_answered_today: true,
      next_attempt_time: today
        .succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN).and_utc()),
    }
  } else {
    DailyStatus {
      has_answered_today: false,
      next_attempt_time: None,
    }
  }
}
