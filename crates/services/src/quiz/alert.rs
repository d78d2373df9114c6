use quiz_core::model::{AggregateStats, SessionState};

/// The single follow-up an alert offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Reload the catalog and start over.
    Retry,
    /// Play another round with the loaded catalog.
    Restart,
}

/// Content of a modal message shown by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertModel {
    pub title: String,
    pub message: String,
    pub button_text: String,
    pub action: RecoveryAction,
}

impl AlertModel {
    #[must_use]
    pub fn load_error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".into(),
            message: message.into(),
            button_text: "Try again".into(),
            action: RecoveryAction::Retry,
        }
    }

    /// Summary of a finished round against lifetime statistics.
    #[must_use]
    pub fn round_finished(session: &SessionState, stats: &AggregateStats) -> Self {
        let mut lines = vec![
            format!(
                "Your result: {}/{}",
                session.correct_count(),
                session.total_questions()
            ),
            format!("Quizzes played: {}", stats.games_count()),
        ];
        if let Some(best) = stats.best_game() {
            lines.push(format!(
                "Record: {}/{} ({})",
                best.correct(),
                best.total(),
                best.achieved_at().format("%d.%m.%y %H:%M")
            ));
        }
        lines.push(format!("Average accuracy: {:.2}%", stats.total_accuracy()));

        Self {
            title: "This round is over!".into(),
            message: lines.join("\n"),
            button_text: "Play again".into(),
            action: RecoveryAction::Restart,
        }
    }
}
