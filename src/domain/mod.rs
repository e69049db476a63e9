pub mod leaderboard;
pub mod lesson;
pub mod user;

pub use leaderboard::{LeaderboardEntry, PastLeaderboard, RankedEntry};
pub use lesson::{Exercise, ExerciseType, Language, Lesson, Level};
pub use user::{LanguageProgress, Role, User};
