use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quiz_core::model::{Movie, QuizQuestion};
use rand::rng;
use rand::Rng;
use rand::seq::SliceRandom;
use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::MoviesLoading;
use crate::error::{LoadFailure, QuestionFactoryError};
use crate::network::NetworkRouting;

/// Notifications from background work back to the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum FactoryEvent {
    DataLoaded { movies: usize },
    DataLoadFailed(LoadFailure),
    QuestionReady(QuizQuestion),
    QuestionFailed(LoadFailure),
}

/// How the next movie is drawn from the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Uniform over the whole catalog on every draw; repeats are possible.
    #[default]
    WithReplacement,
    /// Draw from a shuffled pool that is refilled once exhausted.
    WithoutReplacement,
}

/// Turns the movie catalog into rating questions.
///
/// `load_data` and `request_next_question` run on spawned tasks and report
/// through the event channel; `load` and `next_question` are the same work,
/// awaited inline.
#[derive(Clone)]
pub struct QuestionFactory {
    loader: Arc<dyn MoviesLoading>,
    posters: Arc<dyn NetworkRouting>,
    events: UnboundedSender<FactoryEvent>,
    movies: Arc<Mutex<Vec<Movie>>>,
    unasked: Arc<Mutex<Vec<usize>>>,
    selection: SelectionPolicy,
}

impl QuestionFactory {
    #[must_use]
    pub fn new(
        loader: Arc<dyn MoviesLoading>,
        posters: Arc<dyn NetworkRouting>,
        events: UnboundedSender<FactoryEvent>,
    ) -> Self {
        Self {
            loader,
            posters,
            events,
            movies: Arc::new(Mutex::new(Vec::new())),
            unasked: Arc::new(Mutex::new(Vec::new())),
            selection: SelectionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn selection(&self) -> SelectionPolicy {
        self.selection
    }

    /// Number of movies currently available for questions.
    #[must_use]
    pub fn movies_count(&self) -> usize {
        lock(&self.movies).len()
    }

    /// Fetch the catalog in the background; reports `DataLoaded` or `DataLoadFailed`.
    pub fn load_data(&self) {
        let factory = self.clone();
        tokio::spawn(async move {
            let event = factory.load().await;
            factory.emit(event);
        });
    }

    /// Fetch the catalog and store whatever items it carries.
    ///
    /// A provider error message still replaces the stored movies but is
    /// reported as `DataLoadFailed`.
    pub async fn load(&self) -> FactoryEvent {
        match self.loader.load_movies().await {
            Ok(catalog) => {
                let provider_error = catalog.provider_error().map(str::to_owned);
                let movies = catalog.len();
                self.replace_movies(catalog.items);
                match provider_error {
                    Some(message) => FactoryEvent::DataLoadFailed(LoadFailure::Provider(message)),
                    None => FactoryEvent::DataLoaded { movies },
                }
            }
            Err(err) => FactoryEvent::DataLoadFailed(err.into()),
        }
    }

    /// Build the next question in the background; reports `QuestionReady` or `QuestionFailed`.
    pub fn request_next_question(&self) {
        let factory = self.clone();
        tokio::spawn(async move {
            let event = match factory.next_question().await {
                Ok(question) => FactoryEvent::QuestionReady(question),
                Err(err) => FactoryEvent::QuestionFailed(err.into()),
            };
            factory.emit(event);
        });
    }

    /// Pick a movie, fetch its poster and derive the question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionFactoryError::EmptyCatalog` if no movies are loaded.
    pub async fn next_question(&self) -> Result<QuizQuestion, QuestionFactoryError> {
        let movie = self.select_movie()?;
        let image = self.load_poster(&movie).await;
        Ok(QuizQuestion::from_movie(&movie, image))
    }

    /// Forget which movies were asked this round.
    pub fn reset_round(&self) {
        lock(&self.unasked).clear();
    }

    fn select_movie(&self) -> Result<Movie, QuestionFactoryError> {
        let movies = lock(&self.movies);
        if movies.is_empty() {
            return Err(QuestionFactoryError::EmptyCatalog);
        }

        let index = match self.selection {
            SelectionPolicy::WithReplacement => rng().random_range(0..movies.len()),
            SelectionPolicy::WithoutReplacement => {
                let mut unasked = lock(&self.unasked);
                if unasked.is_empty() {
                    unasked.extend(0..movies.len());
                    unasked.shuffle(&mut rng());
                }
                unasked.pop().ok_or(QuestionFactoryError::EmptyCatalog)?
            }
        };

        movies
            .get(index)
            .cloned()
            .ok_or(QuestionFactoryError::EmptyCatalog)
    }

    async fn load_poster(&self, movie: &Movie) -> Vec<u8> {
        let url = movie.resized_image_url();
        match self.posters.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(movie = %movie.id, %url, %err, "failed to load poster; using placeholder");
                Vec::new()
            }
        }
    }

    fn replace_movies(&self, movies: Vec<Movie>) {
        let mut stored = lock(&self.movies);
        *stored = movies;
        lock(&self.unasked).clear();
    }

    fn emit(&self, event: FactoryEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("quiz presenter is gone; dropping factory event");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
