//! Course assistant backed by a remote completion service, with a local fallback.
//!
//! Rate-limited requests are retried with exponential backoff. Any other failure,
//! or running out of retries, switches the session to local answers for good.

pub mod completion;
pub mod fallback;

use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::dialogue::{Sender, Transcript};
use crate::settings::AssistantSettings;
use completion::{ChatMessage, CompletionBackend, CompletionError, CompletionRequest, Role};

const SYSTEM_PROMPT: &str = "You are a friendly assistant inside a university learning \
    management system. Help students with their courses, grades, assignments and schedule. \
    Keep answers short and practical.";

pub const FALLBACK_NOTICE: &str = "Sorry, I'm having trouble reaching my knowledge service \
    right now, so I'll answer from what I know locally.";

/// Number of transcript messages sent along with each request.
const HISTORY_WINDOW: usize = 10;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause before retry number `retry` (starting at 1): `2^retry` seconds.
pub fn backoff_delay(retry: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(retry))
}

/// State of one open assistant widget.
#[derive(Debug, Clone, Default)]
pub struct AssistantSession {
    using_fallback: bool,
    transcript: Transcript,
}

impl AssistantSession {
    /// Once true, stays true for the rest of this session.
    pub fn using_fallback(&self) -> bool {
        self.using_fallback
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn switch_to_fallback(&mut self) {
        self.using_fallback = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RequestOptions {
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            model: crate::settings::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 300,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

pub struct Assistant<B> {
    backend: Option<B>,
    options: RequestOptions,
}

impl<B: CompletionBackend> Assistant<B> {
    pub fn new(backend: B, settings: &AssistantSettings) -> Self {
        Self {
            backend: Some(backend),
            options: RequestOptions {
                model: settings.model.clone(),
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
                max_retries: settings.max_retries,
            },
        }
    }

    /// An assistant with no remote service; every session answers locally.
    pub fn offline() -> Self {
        Self {
            backend: None,
            options: RequestOptions::default(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    /// Fresh session. Starts in fallback mode when no backend is configured.
    pub fn open_session(&self) -> AssistantSession {
        AssistantSession {
            using_fallback: self.backend.is_none(),
            transcript: Transcript::default(),
        }
    }

    /// Answers one user message, returning the lines to show in order.
    pub async fn reply<R: Rng + Send + ?Sized>(
        &self,
        session: &mut AssistantSession,
        input: &str,
        rng: &mut R,
    ) -> Vec<String> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }
        session.transcript.push(Sender::User, input);

        let mut lines = Vec::new();
        match &self.backend {
            Some(backend) if !session.using_fallback => {
                let request = self.build_request(&session.transcript);
                match self.complete_with_retry(backend, &request).await {
                    Ok(answer) => lines.push(answer),
                    Err(err) => {
                        warn!("Switching assistant session to local answers: {}", err);
                        session.switch_to_fallback();
                        lines.push(FALLBACK_NOTICE.to_string());
                        lines.push(fallback::respond(input, rng).to_string());
                    }
                }
            }
            _ => lines.push(fallback::respond(input, rng).to_string()),
        }

        for line in &lines {
            session.transcript.push(Sender::Bot, line.clone());
        }
        lines
    }

    async fn complete_with_retry(
        &self,
        backend: &B,
        request: &CompletionRequest,
    ) -> Result<String, CompletionError> {
        let mut retry = 0;
        loop {
            match backend.complete(request).await {
                Ok(answer) => return Ok(answer),
                Err(err) if err.is_retryable() && retry < self.options.max_retries => {
                    retry += 1;
                    let delay = backoff_delay(retry);
                    warn!(
                        "Completion rate limited, retry {}/{} in {:?}",
                        retry, self.options.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn build_request(&self, transcript: &Transcript) -> CompletionRequest {
        let entries = transcript.entries();
        let recent = &entries[entries.len().saturating_sub(HISTORY_WINDOW)..];

        let mut messages = Vec::with_capacity(recent.len() + 1);
        messages.push(ChatMessage::new(Role::System, SYSTEM_PROMPT));
        messages.extend(recent.iter().map(|entry| {
            let role = match entry.sender {
                Sender::User => Role::User,
                Sender::Bot => Role::Assistant,
            };
            ChatMessage::new(role, entry.text.clone())
        }));
        debug!("Sending {} messages to the completion service", messages.len());

        CompletionRequest {
            model: self.options.model.clone(),
            messages,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Plays back canned outcomes; succeeds with "remote answer" once the script runs out.
    struct Scripted {
        outcomes: Mutex<VecDeque<Result<String, CompletionError>>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("remote answer".to_string()))
        }
    }

    fn assistant(outcomes: Vec<Result<String, CompletionError>>) -> Assistant<Scripted> {
        Assistant {
            backend: Some(Scripted::new(outcomes)),
            options: RequestOptions::default(),
        }
    }

    fn calls(assistant: &Assistant<Scripted>) -> usize {
        assistant.backend.as_ref().map(Scripted::calls).unwrap_or(0)
    }

    fn rate_limited(times: usize) -> Vec<Result<String, CompletionError>> {
        (0..times).map(|_| Err(CompletionError::RateLimited)).collect()
    }

    #[test]
    fn backoff_doubles_each_retry() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn remote_answer_is_used_when_available() {
        let assistant = assistant(vec![Ok("Your exam is on Friday.".into())]);
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);

        let lines = assistant
            .reply(&mut session, "When is my exam?", &mut rng)
            .await;

        assert_eq!(lines, vec!["Your exam is on Friday.".to_string()]);
        assert!(!session.using_fallback());
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_are_retried_with_backoff() {
        let assistant = assistant(rate_limited(2));
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);
        let started = Instant::now();

        let lines = assistant.reply(&mut session, "hello", &mut rng).await;

        assert_eq!(lines, vec!["remote answer".to_string()]);
        assert_eq!(calls(&assistant), 3);
        assert!(started.elapsed() >= Duration::from_secs(2 + 4));
        assert!(!session.using_fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_switch_to_fallback() {
        let assistant = assistant(rate_limited(10)).with_max_retries(2);
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);

        let lines = assistant
            .reply(&mut session, "when is my assignment due?", &mut rng)
            .await;

        assert_eq!(calls(&assistant), 3);
        assert!(session.using_fallback());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], FALLBACK_NOTICE);
    }

    #[tokio::test]
    async fn terminal_error_falls_back_immediately() {
        let assistant = assistant(vec![Err(CompletionError::Status {
            status: 401,
            message: "Incorrect API key provided".into(),
        })]);
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);

        let lines = assistant.reply(&mut session, "hi", &mut rng).await;

        assert_eq!(calls(&assistant), 1);
        assert!(session.using_fallback());
        assert_eq!(lines[0], FALLBACK_NOTICE);
        assert!(!lines[1].contains("API key"));
    }

    #[tokio::test]
    async fn fallback_is_sticky_for_the_session() {
        let assistant = assistant(vec![Err(CompletionError::EmptyResponse)]);
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);

        assistant.reply(&mut session, "hi", &mut rng).await;
        for input in ["what are my grades?", "thanks", "bye"] {
            let lines = assistant.reply(&mut session, input, &mut rng).await;
            assert_eq!(lines.len(), 1, "no second apology");
            assert!(session.using_fallback());
        }
        assert_eq!(calls(&assistant), 1);
    }

    #[tokio::test]
    async fn new_session_tries_the_service_again() {
        let assistant = assistant(vec![Err(CompletionError::EmptyResponse)]);
        let mut rng = StdRng::seed_from_u64(0);

        let mut first = assistant.open_session();
        assistant.reply(&mut first, "hi", &mut rng).await;
        assert!(first.using_fallback());

        let mut second = assistant.open_session();
        assert!(!second.using_fallback());
        let lines = assistant.reply(&mut second, "hi", &mut rng).await;
        assert_eq!(lines, vec!["remote answer".to_string()]);
    }

    #[tokio::test]
    async fn offline_assistant_never_apologises() {
        let assistant: Assistant<Scripted> = Assistant::offline();
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(session.using_fallback());
        let lines = assistant.reply(&mut session, "hello", &mut rng).await;
        assert_eq!(lines.len(), 1);
        assert_ne!(lines[0], FALLBACK_NOTICE);
    }

    #[tokio::test]
    async fn request_carries_system_prompt_and_recent_history() {
        let assistant = assistant(Vec::new());
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);

        for i in 0..8 {
            assistant
                .reply(&mut session, &format!("message {i}"), &mut rng)
                .await;
        }

        let backend = assistant.backend.as_ref().expect("backend");
        let request = backend
            .last_request
            .lock()
            .unwrap()
            .clone()
            .expect("a request was sent");
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages.len(), HISTORY_WINDOW + 1);
        let last = request.messages.last().expect("history");
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "message 7");
        assert_eq!(request.model, crate::settings::DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let assistant = assistant(Vec::new());
        let mut session = assistant.open_session();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(assistant.reply(&mut session, "  ", &mut rng).await.is_empty());
        assert_eq!(calls(&assistant), 0);
    }
}
