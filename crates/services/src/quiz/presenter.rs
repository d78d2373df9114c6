use std::fmt;
use std::sync::Arc;

use quiz_core::model::{QuizQuestion, QuizStep, SessionState};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::catalog::MoviesLoading;
use crate::error::LoadFailure;
use crate::network::NetworkRouting;
use crate::statistics_service::StatisticService;

use super::alert::{AlertModel, RecoveryAction};
use super::factory::{FactoryEvent, QuestionFactory, SelectionPolicy};

/// Presentation surface driven by the presenter.
///
/// Implementations only render; every decision is made by `QuizPresenter`.
pub trait QuizView: Send + Sync {
    fn show_question(&self, step: &QuizStep);
    fn show_answer_outcome(&self, is_correct: bool);
    fn show_final_summary(&self, alert: &AlertModel);
    fn show_loading_indicator(&self);
    fn hide_loading_indicator(&self);
    fn set_input_enabled(&self, enabled: bool);
    fn show_recoverable_error(&self, alert: &AlertModel);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Loading,
    AwaitingAnswer,
    Evaluating { is_correct: bool },
    Finished,
    Failed(LoadFailure),
}

//
// ─── PRESENTER ─────────────────────────────────────────────────────────────────
//

/// Round state machine: sequences questions, scores answers and reports
/// finished rounds to the statistics service.
///
/// All state changes happen on the task that owns the presenter; background
/// results arrive as `FactoryEvent`s through `next_event`/`handle_event`.
pub struct QuizPresenter {
    view: Arc<dyn QuizView>,
    factory: QuestionFactory,
    events: UnboundedReceiver<FactoryEvent>,
    statistics: StatisticService,
    session: SessionState,
    phase: QuizPhase,
    current_question: Option<QuizQuestion>,
    question_pending: bool,
    catalog_loaded: bool,
}

impl QuizPresenter {
    #[must_use]
    pub fn new(
        view: Arc<dyn QuizView>,
        loader: Arc<dyn MoviesLoading>,
        posters: Arc<dyn NetworkRouting>,
        statistics: StatisticService,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            view,
            factory: QuestionFactory::new(loader, posters, tx),
            events,
            statistics,
            session: SessionState::default(),
            phase: QuizPhase::Idle,
            current_question: None,
            question_pending: false,
            catalog_loaded: false,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.factory = self.factory.with_selection(selection);
        self
    }

    #[must_use]
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn statistics(&self) -> &StatisticService {
        &self.statistics
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.session.is_last_question()
    }

    /// The action the current alert offers, if any.
    #[must_use]
    pub fn pending_action(&self) -> Option<RecoveryAction> {
        match self.phase {
            QuizPhase::Failed(_) => Some(RecoveryAction::Retry),
            QuizPhase::Finished => Some(RecoveryAction::Restart),
            _ => None,
        }
    }

    /// Begin loading the catalog. Only valid from `Idle`.
    pub fn start(&mut self) {
        if self.phase != QuizPhase::Idle {
            tracing::debug!(phase = ?self.phase, "start ignored outside idle");
            return;
        }
        self.phase = QuizPhase::Loading;
        self.catalog_loaded = false;
        self.view.set_input_enabled(false);
        self.view.show_loading_indicator();
        self.factory.load_data();
    }

    /// Wait for the next background result.
    pub async fn next_event(&mut self) -> Option<FactoryEvent> {
        self.events.recv().await
    }

    /// Wait for one background result and apply it.
    ///
    /// Returns `false` once the event channel is closed.
    pub async fn pump(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: FactoryEvent) {
        match event {
            FactoryEvent::DataLoaded { movies } => {
                if self.phase != QuizPhase::Loading {
                    tracing::debug!(phase = ?self.phase, "ignoring stale catalog load");
                    return;
                }
                tracing::debug!(movies, "catalog loaded");
                self.catalog_loaded = true;
                self.request_next_question();
            }
            FactoryEvent::DataLoadFailed(failure) => {
                if self.phase != QuizPhase::Loading {
                    tracing::debug!(phase = ?self.phase, %failure, "ignoring stale catalog failure");
                    return;
                }
                self.fail(failure);
            }
            FactoryEvent::QuestionReady(question) => {
                if !self.question_pending {
                    tracing::debug!("ignoring question nobody asked for");
                    return;
                }
                self.question_pending = false;
                let step = self.convert(&question);
                self.current_question = Some(question);
                self.phase = QuizPhase::AwaitingAnswer;
                self.view.hide_loading_indicator();
                self.view.show_question(&step);
                self.view.set_input_enabled(true);
            }
            FactoryEvent::QuestionFailed(failure) => {
                if !self.question_pending {
                    tracing::debug!(%failure, "ignoring failure of a question nobody asked for");
                    return;
                }
                self.question_pending = false;
                self.fail(failure);
            }
        }
    }

    pub fn yes_button_clicked(&mut self) -> Option<bool> {
        self.answer_given(true)
    }

    pub fn no_button_clicked(&mut self) -> Option<bool> {
        self.answer_given(false)
    }

    /// Score `answer` against the displayed question.
    ///
    /// Returns whether it was correct, or `None` when no question is awaiting
    /// an answer (duplicate or early input).
    pub fn answer_given(&mut self, answer: bool) -> Option<bool> {
        if self.phase != QuizPhase::AwaitingAnswer {
            return None;
        }
        let question = self.current_question.take()?;

        let is_correct = question.is_correct(answer);
        self.session.register_answer(is_correct);
        self.phase = QuizPhase::Evaluating { is_correct };
        self.view.set_input_enabled(false);
        self.view.show_answer_outcome(is_correct);
        Some(is_correct)
    }

    /// Leave `Evaluating`: ask for the next question or close the round.
    pub async fn show_next_question_or_results(&mut self) {
        if !matches!(self.phase, QuizPhase::Evaluating { .. }) {
            return;
        }

        if self.session.is_last_question() {
            self.phase = QuizPhase::Finished;
            self.statistics
                .store(self.session.correct_count(), self.session.total_questions())
                .await;
            let alert = AlertModel::round_finished(&self.session, self.statistics.stats());
            self.view.show_final_summary(&alert);
        } else {
            self.session.switch_to_next_question();
            self.request_next_question();
        }
    }

    /// Run the action offered by the current alert; mismatched actions are ignored.
    pub fn perform(&mut self, action: RecoveryAction) {
        if self.pending_action() != Some(action) {
            tracing::debug!(?action, phase = ?self.phase, "recovery action not available");
            return;
        }
        match action {
            RecoveryAction::Retry => self.retry(),
            RecoveryAction::Restart => self.restart_game(),
        }
    }

    /// Start a new round against the loaded catalog.
    pub fn restart_game(&mut self) {
        if self.phase != QuizPhase::Finished {
            return;
        }
        self.reset_round();
        if self.catalog_loaded {
            self.request_next_question();
        } else {
            self.phase = QuizPhase::Idle;
            self.start();
        }
    }

    /// Recover from a failed load by reloading the catalog from `Idle`.
    pub fn retry(&mut self) {
        if !matches!(self.phase, QuizPhase::Failed(_)) {
            return;
        }
        self.reset_round();
        self.phase = QuizPhase::Idle;
        self.start();
    }

    fn reset_round(&mut self) {
        self.session.reset();
        self.current_question = None;
        self.factory.reset_round();
    }

    fn request_next_question(&mut self) -> bool {
        if self.question_pending {
            tracing::debug!("a question is already on its way");
            return false;
        }
        self.question_pending = true;
        self.phase = QuizPhase::Loading;
        self.view.set_input_enabled(false);
        self.view.show_loading_indicator();
        self.factory.request_next_question();
        true
    }

    fn fail(&mut self, failure: LoadFailure) {
        let alert = AlertModel::load_error(failure.to_string());
        self.phase = QuizPhase::Failed(failure);
        self.current_question = None;
        self.view.hide_loading_indicator();
        self.view.set_input_enabled(false);
        self.view.show_recoverable_error(&alert);
    }

    fn convert(&self, question: &QuizQuestion) -> QuizStep {
        QuizStep {
            image: question.image().to_vec(),
            question: question.text().to_string(),
            question_number: self.session.position_label(),
        }
    }
}

impl fmt::Debug for QuizPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizPresenter")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("question_pending", &self.question_pending)
            .field("catalog_loaded", &self.catalog_loaded)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
