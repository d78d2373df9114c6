mod movie;
mod question;
mod session;
mod stats;

pub use movie::{Catalog, Movie};
pub use question::{QUESTION_TEXT, QuizQuestion, QuizStep, RATING_THRESHOLD};
pub use session::{QUESTIONS_AMOUNT, SessionState};
pub use stats::{AggregateStats, AggregateStatsError, GameRecord, GameRecordError};
