//! Stubs shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use storage::repository::{StatisticsRepository, StatsKey, StorageError};
use url::Url;

use quiz_core::model::QuizStep;

use crate::error::NetworkError;
use crate::network::NetworkRouting;
use crate::quiz::{AlertModel, QuizView};

pub(crate) const POSTER_BYTES: &[u8] = &[0x89, b'P', b'N', b'G'];

/// Catalog JSON with one movie per `(rating, id)` pair.
pub(crate) fn catalog_json(error_message: &str, movies: &[(&str, &str)]) -> Vec<u8> {
    let items: Vec<String> = movies
        .iter()
        .map(|(rating, id)| {
            format!(
                r#"{{"id":"{id}","title":"Movie {id}","imDbRating":"{rating}","image":"https://example.com/posters/{id}._V1_Ratio0.6716_AL_.jpg"}}"#
            )
        })
        .collect();
    format!(
        r#"{{"errorMessage":"{error_message}","items":[{}]}}"#,
        items.join(",")
    )
    .into_bytes()
}

#[derive(Default)]
struct StubState {
    catalog: Option<Result<Vec<u8>, u16>>,
    poster: Option<Result<Vec<u8>, u16>>,
    catalog_requests: usize,
    poster_requests: usize,
    urls: Vec<Url>,
}

/// Answers catalog requests (any URL containing `Top250Movies`) and poster
/// requests with canned responses.
#[derive(Clone, Default)]
pub(crate) struct StubNetworkClient {
    state: Arc<Mutex<StubState>>,
}

impl StubNetworkClient {
    pub(crate) fn with_catalog(body: Vec<u8>) -> Self {
        let stub = Self::default();
        stub.set_catalog(Ok(body));
        stub.set_poster(Ok(POSTER_BYTES.to_vec()));
        stub
    }

    pub(crate) fn with_catalog_status(status: u16) -> Self {
        let stub = Self::default();
        stub.set_catalog(Err(status));
        stub.set_poster(Ok(POSTER_BYTES.to_vec()));
        stub
    }

    pub(crate) fn set_catalog(&self, response: Result<Vec<u8>, u16>) {
        self.state.lock().unwrap().catalog = Some(response);
    }

    pub(crate) fn set_poster(&self, response: Result<Vec<u8>, u16>) {
        self.state.lock().unwrap().poster = Some(response);
    }

    pub(crate) fn catalog_requests(&self) -> usize {
        self.state.lock().unwrap().catalog_requests
    }

    pub(crate) fn poster_requests(&self) -> usize {
        self.state.lock().unwrap().poster_requests
    }

    pub(crate) fn requested_urls(&self) -> Vec<Url> {
        self.state.lock().unwrap().urls.clone()
    }
}

#[async_trait]
impl NetworkRouting for StubNetworkClient {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.urls.push(url.clone());
        let response = if url.path().contains("Top250Movies") {
            state.catalog_requests += 1;
            state.catalog.clone()
        } else {
            state.poster_requests += 1;
            state.poster.clone()
        };
        match response.unwrap_or(Err(404)) {
            Ok(body) => Ok(body),
            Err(code) => Err(NetworkError::HttpStatus(
                StatusCode::from_u16(code).unwrap(),
            )),
        }
    }
}

/// Everything the presenter told the view, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewCall {
    Question(QuizStep),
    Outcome(bool),
    Summary(AlertModel),
    LoadingShown,
    LoadingHidden,
    InputEnabled(bool),
    Error(AlertModel),
}

#[derive(Default)]
pub(crate) struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    pub(crate) fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub(crate) fn questions(&self) -> Vec<QuizStep> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::Question(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_error(&self) -> Option<AlertModel> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ViewCall::Error(alert) => Some(alert),
            _ => None,
        })
    }

    pub(crate) fn last_summary(&self) -> Option<AlertModel> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ViewCall::Summary(alert) => Some(alert),
            _ => None,
        })
    }

    fn push(&self, call: ViewCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl QuizView for RecordingView {
    fn show_question(&self, step: &QuizStep) {
        self.push(ViewCall::Question(step.clone()));
    }

    fn show_answer_outcome(&self, is_correct: bool) {
        self.push(ViewCall::Outcome(is_correct));
    }

    fn show_final_summary(&self, alert: &AlertModel) {
        self.push(ViewCall::Summary(alert.clone()));
    }

    fn show_loading_indicator(&self) {
        self.push(ViewCall::LoadingShown);
    }

    fn hide_loading_indicator(&self) {
        self.push(ViewCall::LoadingHidden);
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.push(ViewCall::InputEnabled(enabled));
    }

    fn show_recoverable_error(&self, alert: &AlertModel) {
        self.push(ViewCall::Error(alert.clone()));
    }
}

/// Repository whose writes always fail; reads see nothing.
#[derive(Clone, Default)]
pub(crate) struct FailingRepository;

#[async_trait]
impl StatisticsRepository for FailingRepository {
    async fn get_value(&self, _key: StatsKey) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn set_values(&self, _entries: &[(StatsKey, String)]) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}
