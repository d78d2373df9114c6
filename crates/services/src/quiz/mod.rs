mod alert;
mod factory;
mod presenter;

// Public API of the quiz subsystem.
pub use alert::{AlertModel, RecoveryAction};
pub use factory::{FactoryEvent, QuestionFactory, SelectionPolicy};
pub use presenter::{QuizPhase, QuizPresenter, QuizView};
