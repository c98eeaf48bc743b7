use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::api_connection::{ServiceError, SuggestionRequest, SuggestionResponse, SuggestionService};
use crate::ingredient_parser::normalize;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A submission arrived while another one was still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a suggestion request is already in progress")]
pub struct BusyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    EmptyInput,
    HttpError,
    NetworkError,
    ParseError,
    Timeout,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::EmptyInput => "empty-input",
            FailureReason::HttpError => "http-error",
            FailureReason::NetworkError => "network-error",
            FailureReason::ParseError => "parse-error",
            FailureReason::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ServiceError> for FailureReason {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::ApiError { .. } => FailureReason::HttpError,
            ServiceError::NetworkError(_) => FailureReason::NetworkError,
            ServiceError::Timeout(_) => FailureReason::Timeout,
            ServiceError::SerializationError(_) | ServiceError::InvalidResponse(_) => {
                FailureReason::ParseError
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(SuggestionResponse),
    Failed(FailureReason),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            RequestState::Failed(reason) => Some(*reason),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Loading => "loading",
            RequestState::Success(_) => "success",
            RequestState::Failed(_) => "failed",
        }
    }
}

/// Room for every transition of one submission plus a few stale ones from the last.
const TRANSITION_FEED_CAPACITY: usize = 16;

/// The single published state plus an ordered feed of every transition into it.
struct StateCell {
    current: watch::Sender<RequestState>,
    transitions: broadcast::Sender<RequestState>,
}

impl StateCell {
    fn new() -> Self {
        let (current, _) = watch::channel(RequestState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_FEED_CAPACITY);
        Self { current, transitions }
    }

    fn get(&self) -> RequestState {
        self.current.borrow().clone()
    }

    fn set(&self, next: RequestState) {
        let to = next.label();
        let previous = self.current.send_replace(next.clone());
        // No subscribers is fine; the watch value is the source of truth.
        let _ = self.transitions.send(next);
        debug!(from = previous.label(), to, "request state changed");
    }
}

/// Owns one submission from acquiring the trigger to releasing it.
///
/// Dropping it before `finish` means the caller stopped polling `submit`: the
/// service call is aborted and a `Loading` state falls back to `Idle`, so the
/// trigger is usable again and nothing keeps running in the background.
struct Submission<'a> {
    flag: &'a AtomicBool,
    cell: &'a StateCell,
    task: Option<AbortHandle>,
    finished: bool,
}

impl<'a> Submission<'a> {
    fn begin(flag: &'a AtomicBool, cell: &'a StateCell) -> Result<Self, BusyError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BusyError)?;
        Ok(Self {
            flag,
            cell,
            task: None,
            finished: false,
        })
    }

    fn track(&mut self, task: AbortHandle) {
        self.task = Some(task);
    }

    fn set(&self, next: RequestState) {
        self.cell.set(next);
    }

    fn finish(mut self, next: RequestState) {
        self.finished = true;
        self.cell.set(next);
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if !self.finished {
            let was_loading = self.cell.current.borrow().is_loading();
            if was_loading {
                info!("submission cancelled while loading, request aborted");
                self.cell.set(RequestState::Idle);
            }
        }
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives one suggestion request at a time and publishes its `RequestState`.
pub struct SuggestionOrchestrator {
    service: Arc<dyn SuggestionService>,
    state: StateCell,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl SuggestionOrchestrator {
    pub fn new(service: Arc<dyn SuggestionService>) -> Self {
        Self::with_timeout(service, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(service: Arc<dyn SuggestionService>, timeout: Duration) -> Self {
        Self {
            service,
            state: StateCell::new(),
            in_flight: AtomicBool::new(false),
            timeout,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state.get()
    }

    /// Latest state only; intermediate states may be skipped by a slow reader.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.current.subscribe()
    }

    /// Every transition in order, starting with the next one.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<RequestState> {
        self.state.transitions.subscribe()
    }

    /// True while a submission holds the trigger.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one submission to completion. Only a concurrent submission is reported
    /// as an error; every other outcome ends up in the published state.
    ///
    /// Dropping the returned future aborts the service call, resets `Loading` to
    /// `Idle` and frees the trigger.
    pub async fn submit(&self, raw_text: &str, use_backtracking: bool) -> Result<(), BusyError> {
        let mut submission = Submission::begin(&self.in_flight, &self.state).inspect_err(|_| {
            warn!("submission rejected, a request is already in flight");
        })?;

        submission.set(RequestState::Idle);

        let ingredients = match normalize(raw_text) {
            Ok(ingredients) => ingredients,
            Err(err) => {
                info!("submission rejected before sending: {}", err);
                submission.finish(RequestState::Failed(FailureReason::EmptyInput));
                return Ok(());
            }
        };

        let request = SuggestionRequest::new(ingredients, use_backtracking);
        info!(
            ingredients = request.ingredients.len(),
            use_backtracking, "requesting recipe suggestions"
        );
        submission.set(RequestState::Loading);

        let outcome = self.call_service(&mut submission, request).await;
        match outcome {
            Ok(response) => {
                info!(
                    suggestions = response.suggestions.len(),
                    complements = response.complementary_ingredients.len(),
                    "suggestions received"
                );
                submission.finish(RequestState::Success(response));
            }
            Err(reason) => {
                warn!(%reason, "suggestion request failed");
                submission.finish(RequestState::Failed(reason));
            }
        }
        Ok(())
    }

    async fn call_service(
        &self,
        submission: &mut Submission<'_>,
        request: SuggestionRequest,
    ) -> Result<SuggestionResponse, FailureReason> {
        let service = Arc::clone(&self.service);
        let task = tokio::spawn(async move { service.suggest(&request).await });
        submission.track(task.abort_handle());

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(err))) => {
                debug!(error = %err, "suggestion service returned an error");
                Err(FailureReason::from(&err))
            }
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "suggestion task did not complete");
                Err(FailureReason::NetworkError)
            }
            // The tracked handle aborts the task when the submission is dropped.
            Err(_) => Err(FailureReason::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_strings() {
        assert_eq!(FailureReason::EmptyInput.to_string(), "empty-input");
        assert_eq!(FailureReason::HttpError.as_str(), "http-error");
        assert_eq!(FailureReason::NetworkError.as_str(), "network-error");
        assert_eq!(FailureReason::ParseError.as_str(), "parse-error");
        assert_eq!(FailureReason::Timeout.as_str(), "timeout");
    }

    #[test]
    fn test_service_errors_map_to_reasons() {
        let api = ServiceError::ApiError {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            error_body: String::new(),
        };
        assert_eq!(FailureReason::from(&api), FailureReason::HttpError);
        let transport = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert_eq!(
            FailureReason::from(&ServiceError::from(transport)),
            FailureReason::NetworkError
        );
        let counts = crate::api_connection::InconsistentCounts {
            name: "Broken".to_string(),
            matching: 3,
            total: 1,
        };
        assert_eq!(
            FailureReason::from(&ServiceError::InvalidResponse(counts)),
            FailureReason::ParseError
        );
        let json_err = serde_json::from_str::<SuggestionResponse>("{").unwrap_err();
        assert_eq!(
            FailureReason::from(&ServiceError::SerializationError(json_err)),
            FailureReason::ParseError
        );
    }

    #[test]
    fn test_submission_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let cell = StateCell::new();
        let submission = Submission::begin(&flag, &cell).unwrap();
        assert!(flag.load(Ordering::Acquire));
        assert!(matches!(Submission::begin(&flag, &cell), Err(BusyError)));
        drop(submission);
        assert!(!flag.load(Ordering::Acquire));
        assert!(Submission::begin(&flag, &cell).is_ok());
    }

    #[test]
    fn test_abandoned_submission_leaves_loading() {
        let flag = AtomicBool::new(false);
        let cell = StateCell::new();
        let submission = Submission::begin(&flag, &cell).unwrap();
        submission.set(RequestState::Loading);
        drop(submission);
        assert_eq!(cell.get(), RequestState::Idle);
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_finished_submission_keeps_its_outcome() {
        let flag = AtomicBool::new(false);
        let cell = StateCell::new();
        let mut feed = cell.transitions.subscribe();
        let submission = Submission::begin(&flag, &cell).unwrap();
        submission.set(RequestState::Loading);
        submission.finish(RequestState::Failed(FailureReason::HttpError));

        assert_eq!(cell.get(), RequestState::Failed(FailureReason::HttpError));
        assert_eq!(feed.try_recv().unwrap(), RequestState::Loading);
        assert_eq!(feed.try_recv().unwrap(), RequestState::Failed(FailureReason::HttpError));
        assert!(feed.try_recv().is_err());
        assert!(!flag.load(Ordering::Acquire));
    }
}
