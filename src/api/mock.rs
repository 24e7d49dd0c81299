//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::oneshot;

use super::{ApiError, ApiRequest, Transport};

enum Scripted {
    Ready(Result<Value, ApiError>),
    Deferred(oneshot::Receiver<Result<Value, ApiError>>),
}

/// Records every request and answers from a FIFO of scripted responses.
/// Once the queue is empty the fallback answers, if set.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<Result<Value, ApiError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_ok(&self, value: Value) {
        self.push(Scripted::Ready(Ok(value)));
    }

    pub fn respond_err(&self, err: ApiError) {
        self.push(Scripted::Ready(Err(err)));
    }

    /// Queue a response that completes only when the returned sender fires.
    pub fn defer(&self) -> oneshot::Sender<Result<Value, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.push(Scripted::Deferred(rx));
        tx
    }

    pub fn always(&self, response: Result<Value, ApiError>) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, scripted: Scripted) {
        self.responses.lock().unwrap().push_back(scripted);
    }
}

impl Transport for MockTransport {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.calls.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        let fallback = self.fallback.lock().unwrap().clone();
        async move {
            match next {
                Some(Scripted::Ready(result)) => result,
                Some(Scripted::Deferred(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(ApiError::Transport("deferred response dropped".into()))),
                None => fallback
                    .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into()))),
            }
        }
        .boxed()
    }
}
