//! Test support: an in-memory, scriptable [`HttpExecutor`].
//!
//! ```rust
//! use restcall_core::testing::MockExecutor;
//! use restcall_core::{ExecutionContext, HttpResponse, RestClient};
//!
//! # fn main() -> Result<(), restcall_core::RestCallError> {
//! let executor = MockExecutor::default();
//! executor.push_response(HttpResponse::new(201));
//!
//! let client = RestClient::builder().with_executor(executor.clone()).build()?;
//! let mut ctx = ExecutionContext::new();
//!
//! let mut call = client.call_url("api.example.com/notes");
//! call.post_body(&mut ctx, "hello")?;
//! assert_eq!(call.response_status_code()?, 201);
//!
//! // the queue is empty, back to the default response
//! call.post_body(&mut ctx, "again")?;
//! assert_eq!(call.response_status_code()?, 200);
//!
//! let requests = executor.requests();
//! assert_eq!(requests.len(), 2);
//! assert_eq!(requests[0].body.as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, TransportError};

#[derive(Debug)]
struct MockState {
    default_response: HttpResponse,
    responses: VecDeque<Result<HttpResponse, String>>,
    unsupported: HashSet<HttpMethod>,
    requests: Vec<HttpRequest>,
}

/// [`HttpExecutor`] recording requests and replying with scripted responses.
///
/// Queued outcomes are consumed first, in order. Once the queue is empty every request
/// gets the default response (`200 OK` with an empty body unless changed). Clones
/// share the same state.
#[derive(Debug, Clone)]
pub struct MockExecutor {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new(HttpResponse::new(200))
    }
}

impl MockExecutor {
    /// Creates an executor replying `default_response` to every request.
    pub fn new(default_response: HttpResponse) -> Self {
        let state = MockState {
            default_response,
            responses: VecDeque::new(),
            unsupported: HashSet::new(),
            requests: vec![],
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the default response.
    pub fn set_default_response(&self, response: HttpResponse) {
        self.state().default_response = response;
    }

    /// Queues a response for a later request.
    pub fn push_response(&self, response: HttpResponse) {
        self.state().responses.push_back(Ok(response));
    }

    /// Queues a transport failure for a later request.
    pub fn push_transport_error(&self, message: impl Into<String>) {
        self.state().responses.push_back(Err(message.into()));
    }

    /// Makes the executor report a method as unsupported.
    pub fn reject_method(&self, method: HttpMethod) {
        self.state().unsupported.insert(method);
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    /// The last request received.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state().requests.last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }
}

impl HttpExecutor for MockExecutor {
    fn supports(&self, method: HttpMethod) -> bool {
        !self.state().unsupported.contains(&method)
    }

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state();
        trace!(url = %request.redacted_url(), method = %request.method, "mock request");
        state.requests.push(request.clone());

        match state.responses.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(message)),
            None => Ok(state.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            url: url.to_string(),
            method: HttpMethod::Get,
            headers: IndexMap::new(),
            body: None,
        }
    }

    #[test]
    fn test_scripted_outcomes_then_default() {
        let executor = MockExecutor::new(HttpResponse::new(204));
        executor.push_response(HttpResponse::new(201));
        executor.push_transport_error("connection refused");

        let first = executor.execute(&request("h/1")).expect("a response");
        let second = executor.execute(&request("h/2"));
        let third = executor.execute(&request("h/3")).expect("a response");

        assert_eq!(first.status_code, 201);
        assert_eq!(
            second.map_err(|err| err.to_string()).err().as_deref(),
            Some("connection refused")
        );
        assert_eq!(third.status_code, 204);
        assert_eq!(executor.request_count(), 3);
        assert_eq!(executor.last_request().map(|it| it.url).as_deref(), Some("h/3"));
    }

    #[test]
    fn test_reject_method() {
        let executor = MockExecutor::default();

        executor.reject_method(HttpMethod::Trace);

        assert!(!executor.supports(HttpMethod::Trace));
        assert!(executor.supports(HttpMethod::Get));
    }

    #[test]
    fn test_clones_share_state() {
        let executor = MockExecutor::default();
        let clone = executor.clone();

        clone.execute(&request("h")).expect("a response");

        assert_eq!(executor.request_count(), 1);
    }
}
