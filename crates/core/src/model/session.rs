/// Number of questions in one round.
pub const QUESTIONS_AMOUNT: u32 = 10;

/// Position and score within the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    current_index: u32,
    correct_count: u32,
    answered: u32,
    total_questions: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(QUESTIONS_AMOUNT)
    }
}

impl SessionState {
    /// A fresh round of `total_questions` (at least one).
    #[must_use]
    pub fn new(total_questions: u32) -> Self {
        Self {
            current_index: 0,
            correct_count: 0,
            answered: 0,
            total_questions: total_questions.max(1),
        }
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index == self.total_questions - 1
    }

    /// Count the answer to the question at `current_index`.
    ///
    /// Returns `false` (and changes nothing) if it was already counted.
    pub fn register_answer(&mut self, is_correct: bool) -> bool {
        if self.answered > self.current_index {
            return false;
        }
        self.answered += 1;
        if is_correct {
            self.correct_count += 1;
        }
        true
    }

    /// Move to the next question once the current one has been answered.
    ///
    /// Returns `false` on the last question or while the current one is unanswered.
    pub fn switch_to_next_question(&mut self) -> bool {
        if self.is_last_question() || self.answered <= self.current_index {
            return false;
        }
        self.current_index += 1;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.total_questions);
    }

    /// Label such as `3/10` for the question at `current_index`.
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.total_questions)
    }
}
