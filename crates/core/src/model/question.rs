use crate::model::Movie;

/// Prompt shown for every generated question.
pub const QUESTION_TEXT: &str = "Is this movie's rating higher than 7?";

/// A movie rated strictly above this answers "yes".
pub const RATING_THRESHOLD: f32 = 7.0;

/// A yes/no question about a single movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    image: Vec<u8>,
    text: String,
    correct_answer: bool,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(image: Vec<u8>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            text: text.into(),
            correct_answer,
        }
    }

    /// Build the rating question for `movie` with an already fetched poster.
    #[must_use]
    pub fn from_movie(movie: &Movie, image: Vec<u8>) -> Self {
        Self::new(image, QUESTION_TEXT, movie.rating_value() > RATING_THRESHOLD)
    }

    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, answer: bool) -> bool {
        answer == self.correct_answer
    }
}

/// What the presentation layer needs to render one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStep {
    pub image: Vec<u8>,
    pub question: String,
    /// Position label such as `3/10`.
    pub question_number: String,
}
