//! A scripted [`Llm`] for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::llm::{Llm, LlmRequest, LlmResponse};

type Reply = std::result::Result<String, String>;

/// Scripted [`Llm`] for tests and offline runs.
///
/// Queued replies are consumed first; once the queue is empty every call
/// returns the fallback reply. Every request is recorded.
pub struct MockLlm {
    name: String,
    fallback: Reply,
    queue: Mutex<VecDeque<Reply>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    /// A mock that always answers `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_fallback(Ok(reply.into()))
    }

    /// A mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_fallback(Err(message.into()))
    }

    fn with_fallback(fallback: Reply) -> Self {
        Self {
            name: "mock-llm".to_string(),
            fallback,
            queue: Mutex::new(VecDeque::new()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set the name reported by [`Llm::name`] and in responses.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a one-off successful reply.
    pub fn with_response(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a one-off failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The prompt of the most recent request.
    pub fn last_prompt(&self) -> Option<String> {
        self.requests.lock().ok().and_then(|r| r.last().map(|req| req.prompt.clone()))
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(reply);
        }
    }

    fn next_reply(&self) -> Reply {
        self.queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_reply() {
            Ok(text) => Ok(LlmResponse { text, model: self.name.clone() }),
            Err(message) => Err(ModelError::Unavailable(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_replies_come_before_the_fallback() {
        let llm = MockLlm::new("fallback").with_response("first").with_error("down");

        assert_eq!(llm.generate(LlmRequest::new("a")).await.unwrap().text, "first");
        assert!(matches!(
            llm.generate(LlmRequest::new("b")).await,
            Err(ModelError::Unavailable(ref m)) if m == "down"
        ));
        assert_eq!(llm.generate(LlmRequest::new("c")).await.unwrap().text, "fallback");
        assert_eq!(llm.generate(LlmRequest::new("d")).await.unwrap().text, "fallback");
    }

    #[tokio::test]
    async fn records_prompts() {
        let llm = MockLlm::new("ok");
        llm.generate(LlmRequest::new("one")).await.unwrap();
        llm.generate(LlmRequest::new("two")).await.unwrap();

        assert_eq!(llm.requests().len(), 2);
        assert_eq!(llm.last_prompt().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn failing_mock_always_fails() {
        let llm = MockLlm::failing("connection refused");
        for _ in 0..2 {
            assert!(llm.generate(LlmRequest::new("x")).await.is_err());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let llm = MockLlm::new("slow").with_delay(Duration::from_secs(30));
        let started = tokio::time::Instant::now();
        llm.generate(LlmRequest::new("x")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(30));
    }
}
