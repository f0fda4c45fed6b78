//! Chat session: the submit/respond state machine
//!
//! A session owns its conversation log, its settings and its response
//! cache. `submit` takes `&mut self`, so only one generation can be in
//! flight per session.

use parley_core::bus::{EventBus, SessionEvent};
use parley_core::cache::{CacheStats, Fingerprint, ResponseCache};
use parley_core::config::Config;
use parley_core::session::{
    AutoSummarizePolicy, ConversationLog, Role, SessionState, SummaryTrigger,
};
use parley_core::{Error, Result};
use parley_providers::{render_window, CompletionProvider, SummarizationProvider};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::context::build_chat_prompt;
use crate::selector::Selector;

/// Current model and mode of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    /// Canonical backend model id
    pub model: String,
    /// Canonical mode name
    pub mode: String,
}

/// How a session starts
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Model label or id
    pub model: String,
    /// Conversation mode
    pub mode: String,
    /// Assistant greeting that opens (and re-opens after clear) the log
    pub greeting: Option<String>,
    pub policy: AutoSummarizePolicy,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.chat.model.clone(),
            mode: config.chat.mode.clone(),
            greeting: config
                .chat
                .seed_greeting
                .then(|| config.chat.greeting.clone()),
            policy: AutoSummarizePolicy::from(&config.summary),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of one successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The assistant reply that was appended to the log
    pub reply: String,
    /// Digest produced if the auto-summarize trigger fired and succeeded
    pub summary: Option<String>,
}

/// Message counts for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversationStats {
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub cached_responses: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// A single interactive conversation
pub struct ChatSession {
    id: String,
    log: ConversationLog,
    config: SessionConfig,
    state: SessionState,
    cache: ResponseCache,
    trigger: SummaryTrigger,
    selector: Selector,
    completer: Arc<dyn CompletionProvider>,
    summarizer: Arc<dyn SummarizationProvider>,
    bus: EventBus,
    latest_summary: Option<String>,
}

impl ChatSession {
    /// Create a new session
    pub fn new(
        completer: Arc<dyn CompletionProvider>,
        summarizer: Arc<dyn SummarizationProvider>,
        selector: Selector,
        options: SessionOptions,
    ) -> Self {
        let config = SessionConfig {
            model: selector.model_id_for(&options.model).to_string(),
            mode: selector.resolve_mode(&options.mode).to_string(),
        };
        let log = match options.greeting {
            Some(greeting) => ConversationLog::seeded(greeting),
            None => ConversationLog::new(),
        };
        let id = uuid::Uuid::new_v4().to_string();

        info!(
            session_id = %id,
            model = %config.model,
            mode = %config.mode,
            "Chat session started"
        );

        Self {
            id,
            log,
            config,
            state: SessionState::Idle,
            cache: ResponseCache::new(),
            trigger: SummaryTrigger::new(options.policy),
            selector,
            completer,
            summarizer,
            bus: EventBus::new(),
            latest_summary: None,
        }
    }

    /// Submit user text and wait for the assistant reply.
    ///
    /// The user turn is recorded before the completion call and is kept if
    /// the call fails; in that case no assistant turn is appended and the
    /// session accepts a resubmission.
    pub async fn submit(&mut self, text: &str) -> Result<Exchange> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("message is empty".to_string()));
        }
        if !self.state.accepts_input() {
            return Err(Error::Session(format!(
                "cannot accept input while {}",
                self.state
            )));
        }

        let span = info_span!("submit", session_id = %self.id, turn = self.log.len());
        self.run_exchange(text).instrument(span).await
    }

    async fn run_exchange(&mut self, text: &str) -> Result<Exchange> {
        self.append(Role::User, text);
        self.transition(SessionState::AwaitingResponse);

        let prompt = build_chat_prompt(
            self.selector.system_prompt_for(&self.config.mode),
            self.log.turns(),
        );
        let model = self.config.model.clone();
        let key = Fingerprint::completion(prompt.clone(), model.clone());
        let completer = self.completer.clone();

        debug!("Requesting completion from {}", model);
        let pending = PendingResponse {
            state: &mut self.state,
            bus: &self.bus,
            session_id: &self.id,
            armed: true,
        };
        let result = self
            .cache
            .fetch(key, || async move { completer.complete(&prompt, &model).await })
            .await;
        pending.disarm();

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Completion failed: {}", e);
                self.transition(SessionState::Failed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        self.append(Role::Assistant, &reply);
        self.transition(SessionState::ResponseReady);

        let summary = if self.trigger.check(self.log.len()) {
            self.auto_summarize().await
        } else {
            None
        };

        self.transition(SessionState::Idle);
        Ok(Exchange { reply, summary })
    }

    async fn auto_summarize(&mut self) -> Option<String> {
        let log_len = self.log.len();
        info!(log_len, "Auto-summarize triggered");

        match self.summarize_window().await {
            Ok(summary) => {
                self.bus.emit(SessionEvent::SummaryReady {
                    session_id: self.id.clone(),
                    log_len,
                    summary: summary.clone(),
                });
                Some(summary)
            }
            Err(e) => {
                warn!("Auto-summarize failed: {}", e);
                self.bus.emit(SessionEvent::SummaryFailed {
                    session_id: self.id.clone(),
                    log_len,
                    error: e.to_string(),
                });
                None
            }
        }
    }

    /// Summarize the trailing window now, regardless of the trigger
    pub async fn summarize_now(&mut self) -> Result<String> {
        if self.log.is_empty() {
            return Err(Error::Validation("conversation is empty".to_string()));
        }
        self.summarize_window().await
    }

    async fn summarize_window(&mut self) -> Result<String> {
        let transcript = render_window(self.log.turns(), self.trigger.policy().window);
        let key = Fingerprint::summary(transcript.clone());
        let summarizer = self.summarizer.clone();

        let summary = self
            .cache
            .fetch(key, || async move {
                summarizer.summarize_transcript(&transcript).await
            })
            .await?;

        self.latest_summary = Some(summary.clone());
        Ok(summary)
    }

    /// Reset the conversation (to the greeting if seeded).
    /// The response cache is kept.
    pub fn clear(&mut self) {
        self.log.reset();
        self.trigger.reset();
        self.latest_summary = None;
        info!(session_id = %self.id, "Conversation cleared");
        self.bus.emit(SessionEvent::ConversationCleared {
            session_id: self.id.clone(),
            log_len: self.log.len(),
        });
        self.transition(SessionState::Idle);
    }

    /// Switch model by label or id. Returns whether the model changed;
    /// a change wipes the whole response cache.
    pub fn set_model(&mut self, label: &str) -> bool {
        let model = self.selector.model_id_for(label).to_string();
        if model == self.config.model {
            return false;
        }

        let entries = self.cache.invalidate_all();
        info!(
            session_id = %self.id,
            from = %self.config.model,
            to = %model,
            entries,
            "Model changed, response cache cleared"
        );
        self.config.model = model.clone();
        self.bus.emit(SessionEvent::CacheInvalidated {
            session_id: self.id.clone(),
            entries,
            model,
        });
        true
    }

    /// Switch conversation mode. Unknown modes resolve to the default.
    pub fn set_mode(&mut self, mode: &str) -> &str {
        self.config.mode = self.selector.resolve_mode(mode).to_string();
        debug!(session_id = %self.id, mode = %self.config.mode, "Mode changed");
        &self.config.mode
    }

    fn append(&mut self, role: Role, content: &str) {
        let index = self.log.len();
        let turn = parley_core::session::Turn::new(role, content);
        self.log.push(turn.clone());
        self.bus.emit(SessionEvent::TurnAppended {
            session_id: self.id.clone(),
            index,
            turn,
        });
    }

    fn transition(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        debug!("Session state {} -> {}", self.state, state);
        self.state = state.clone();
        self.bus.emit(SessionEvent::StateChanged {
            session_id: self.id.clone(),
            state,
        });
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Digest from the most recent summarization, if any since the last clear
    pub fn latest_summary(&self) -> Option<&str> {
        self.latest_summary.as_deref()
    }

    /// Event bus a renderer can take the receiver from
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn stats(&self) -> ConversationStats {
        let cache = self.cache.stats();
        ConversationStats {
            user_messages: self.log.count(Role::User),
            assistant_messages: self.log.count(Role::Assistant),
            cached_responses: cache.entries,
            cache_hits: cache.hits,
            cache_misses: cache.misses,
        }
    }
}

/// Moves the session to `Failed` if a submit is dropped mid-request
struct PendingResponse<'a> {
    state: &'a mut SessionState,
    bus: &'a EventBus,
    session_id: &'a str,
    armed: bool,
}

impl PendingResponse<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingResponse<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(session_id = %self.session_id, "Submit dropped while awaiting a response");
        let state = SessionState::Failed {
            reason: "request cancelled".to_string(),
        };
        *self.state = state.clone();
        self.bus.emit(SessionEvent::StateChanged {
            session_id: self.session_id.to_string(),
            state,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_providers::{ProviderError, ProviderResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Completion fake: replays scripted results, then echoes a numbered reply
    #[derive(Default)]
    struct ScriptedCompleter {
        script: Mutex<VecDeque<ProviderResult<String>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedCompleter {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn push(&self, result: ProviderResult<String>) {
            self.script.lock().unwrap().push_back(result);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.calls.lock().unwrap().last().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedCompleter {
        async fn complete(&self, prompt: &str, model: &str) -> ProviderResult<String> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((prompt.to_string(), model.to_string()));
                calls.len()
            };
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("reply {}", n)))
        }

        fn default_model(&self) -> String {
            "claude-3-5-sonnet".to_string()
        }
    }

    /// Summarization fake: records every transcript it is asked about
    #[derive(Default)]
    struct RecordingSummarizer {
        transcripts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl SummarizationProvider for RecordingSummarizer {
        async fn summarize(&self, text: &str) -> ProviderResult<String> {
            self.summarize_transcript(text).await
        }

        async fn summarize_transcript(&self, transcript: &str) -> ProviderResult<String> {
            let mut transcripts = self.transcripts.lock().unwrap();
            transcripts.push(transcript.to_string());
            if self.fail {
                return Err(ProviderError::RequestFailed("summarizer down".to_string()));
            }
            Ok(format!("summary {}", transcripts.len()))
        }
    }

    fn unseeded() -> SessionOptions {
        SessionOptions {
            greeting: None,
            ..SessionOptions::default()
        }
    }

    fn seeded() -> SessionOptions {
        SessionOptions {
            greeting: Some(Config::default().chat.greeting),
            ..SessionOptions::default()
        }
    }

    fn session_with(
        completer: Arc<ScriptedCompleter>,
        summarizer: Arc<RecordingSummarizer>,
        options: SessionOptions,
    ) -> ChatSession {
        ChatSession::new(completer, summarizer, Selector::default(), options)
    }

    #[tokio::test]
    async fn test_cycles_preserve_order() {
        let completer = ScriptedCompleter::new();
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            unseeded(),
        );

        for i in 0..4 {
            let exchange = session.submit(&format!("question {}", i)).await.unwrap();
            assert_eq!(exchange.reply, format!("reply {}", i + 1));
        }

        let log = session.log();
        assert_eq!(log.len(), 8);
        assert_eq!(log.turns()[0].content(), "question 0");
        assert_eq!(log.turns()[1].content(), "reply 1");
        assert_eq!(log.turns()[6].content(), "question 3");
        assert_eq!(log.turns()[7].role(), Role::Assistant);
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[tokio::test]
    async fn test_seeded_session_starts_with_greeting() {
        let session = session_with(
            ScriptedCompleter::new(),
            Arc::new(RecordingSummarizer::default()),
            seeded(),
        );
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.log().turns()[0].role(), Role::Assistant);
        assert_eq!(session.stats().assistant_messages, 1);
        assert_eq!(session.stats().user_messages, 0);
    }

    #[tokio::test]
    async fn test_prompt_contains_system_prompt_and_history() {
        let completer = ScriptedCompleter::new();
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            SessionOptions {
                mode: "Tech Mentor".to_string(),
                ..unseeded()
            },
        );

        session.submit("What is DNS?").await.unwrap();
        let system = session.selector().system_prompt_for("Tech Mentor").to_string();
        assert_eq!(
            completer.last_prompt(),
            format!("{}\n\nUser: What is DNS?\n\nAssistant:", system)
        );

        session.submit("And TTL?").await.unwrap();
        assert!(completer
            .last_prompt()
            .ends_with("User: What is DNS?\n\nAssistant: reply 1\n\nUser: And TTL?\n\nAssistant:"));
    }

    #[tokio::test]
    async fn test_auto_summarize_uses_last_ten_turns() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let mut session = session_with(ScriptedCompleter::new(), summarizer.clone(), unseeded());

        let mut fired_at = Vec::new();
        for i in 0..10 {
            let exchange = session.submit(&format!("q{}", i)).await.unwrap();
            if exchange.summary.is_some() {
                fired_at.push(session.log().len());
            }
        }

        assert_eq!(fired_at, vec![10, 20]);
        let transcripts = summarizer.transcripts.lock().unwrap();
        assert_eq!(transcripts.len(), 2);

        let expected: Vec<String> = session
            .log()
            .tail(10)
            .iter()
            .map(|t| format!("{}: {}", t.role().as_str(), t.content()))
            .collect();
        assert_eq!(transcripts[1], expected.join("\n"));
        assert!(transcripts[1].starts_with("user: q5\nassistant: reply 6"));
        assert_eq!(session.latest_summary(), Some("summary 2"));
    }

    #[tokio::test]
    async fn test_summary_trigger_is_configurable() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let mut session = session_with(
            ScriptedCompleter::new(),
            summarizer.clone(),
            SessionOptions {
                policy: AutoSummarizePolicy::new(4, 2),
                ..unseeded()
            },
        );

        session.submit("a").await.unwrap();
        let exchange = session.submit("b").await.unwrap();
        assert_eq!(exchange.summary.as_deref(), Some("summary 1"));
        assert_eq!(
            summarizer.transcripts.lock().unwrap()[0],
            "user: b\nassistant: reply 2"
        );
    }

    #[tokio::test]
    async fn test_default_config_auto_summarizes() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let mut session = session_with(
            ScriptedCompleter::new(),
            summarizer.clone(),
            SessionOptions::from_config(&Config::default()),
        );

        let mut summaries = Vec::new();
        for i in 0..5 {
            let exchange = session.submit(&format!("q{}", i)).await.unwrap();
            summaries.push(exchange.summary);
        }

        assert_eq!(session.log().len(), 10);
        assert!(summaries[..4].iter().all(Option::is_none));
        assert_eq!(summaries[4].as_deref(), Some("summary 1"));
        assert_eq!(summarizer.transcripts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seeded_session_summarizes_on_odd_period() {
        let mut config = Config::default();
        config.chat.seed_greeting = true;
        config.summary.every = 5;
        let summarizer = Arc::new(RecordingSummarizer::default());
        let mut session = session_with(
            ScriptedCompleter::new(),
            summarizer.clone(),
            SessionOptions::from_config(&config),
        );

        assert!(session.submit("q0").await.unwrap().summary.is_none());
        let exchange = session.submit("q1").await.unwrap();
        assert_eq!(session.log().len(), 5);
        assert_eq!(exchange.summary.as_deref(), Some("summary 1"));
        assert!(summarizer.transcripts.lock().unwrap()[0].starts_with("assistant: Hello!"));
    }

    #[tokio::test]
    async fn test_completion_failure_keeps_user_turn() {
        let completer = ScriptedCompleter::new();
        completer.push(Err(ProviderError::RequestFailed("HTTP 500".to_string())));
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            seeded(),
        );
        let prior = session.log().len();

        let err = session.submit("hello").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
        assert_eq!(session.log().len(), prior + 1);
        assert_eq!(session.log().last().unwrap().role(), Role::User);
        assert!(matches!(session.state(), SessionState::Failed { .. }));
        assert!(session.state().accepts_input());

        let exchange = session.submit("hello").await.unwrap();
        assert_eq!(exchange.reply, "reply 2");
        assert_eq!(session.log().len(), prior + 3);
        assert_eq!(session.state(), &SessionState::Idle);
    }

    /// Never answers the first request, then replies normally
    #[derive(Default)]
    struct StallOnceCompleter {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl CompletionProvider for StallOnceCompleter {
        async fn complete(&self, _prompt: &str, _model: &str) -> ProviderResult<String> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if n == 1 {
                std::future::pending::<()>().await;
            }
            Ok(format!("reply {}", n))
        }

        fn default_model(&self) -> String {
            "claude-3-5-sonnet".to_string()
        }
    }

    #[tokio::test]
    async fn test_dropped_submit_leaves_session_usable() {
        let mut session = ChatSession::new(
            Arc::new(StallOnceCompleter::default()),
            Arc::new(RecordingSummarizer::default()),
            Selector::default(),
            unseeded(),
        );

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), session.submit("hi")).await;
        assert!(timed_out.is_err());

        assert_eq!(session.log().len(), 1);
        assert!(matches!(session.state(), SessionState::Failed { .. }));
        assert!(session.state().accepts_input());
        assert_eq!(session.cache_stats().entries, 0);

        let exchange = session.submit("hi").await.unwrap();
        assert_eq!(exchange.reply, "reply 2");
        assert_eq!(session.log().len(), 3);
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[tokio::test]
    async fn test_summary_failure_does_not_fail_exchange() {
        let summarizer = Arc::new(RecordingSummarizer {
            fail: true,
            ..RecordingSummarizer::default()
        });
        let mut session = session_with(
            ScriptedCompleter::new(),
            summarizer,
            SessionOptions {
                policy: AutoSummarizePolicy::new(2, 2),
                ..unseeded()
            },
        );
        let mut rx = session.events().take_receiver().unwrap();

        let exchange = session.submit("hi").await.unwrap();
        assert_eq!(exchange.summary, None);
        assert_eq!(session.state(), &SessionState::Idle);

        let mut saw_failure = false;
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::SummaryFailed { log_len, .. } = event {
                assert_eq!(log_len, 2);
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test]
    async fn test_identical_prompt_is_served_from_cache() {
        let completer = ScriptedCompleter::new();
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            seeded(),
        );

        let first = session.submit("hi").await.unwrap();
        session.clear();
        let second = session.submit("hi").await.unwrap();

        assert_eq!(completer.call_count(), 1);
        assert_eq!(first.reply, second.reply);
        assert_eq!(session.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_model_change_wipes_cache() {
        let completer = ScriptedCompleter::new();
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            seeded(),
        );

        session.submit("hi").await.unwrap();
        session.clear();
        assert!(session.set_model("mistral-7b - Fast, great for summarization"));
        assert_eq!(session.config().model, "mistral-7b");
        assert!(session.set_model("claude-3-5-sonnet"));
        session.submit("hi").await.unwrap();

        assert_eq!(completer.call_count(), 2);
    }

    #[tokio::test]
    async fn test_same_model_keeps_cache() {
        let mut session = session_with(
            ScriptedCompleter::new(),
            Arc::new(RecordingSummarizer::default()),
            seeded(),
        );
        session.submit("hi").await.unwrap();

        assert!(!session.set_model("claude-3-5-sonnet"));
        assert!(!session.set_model("unknown label"));
        assert_eq!(session.cache_stats().entries, 1);
    }

    #[tokio::test]
    async fn test_clear_resets_log_and_state() {
        let completer = ScriptedCompleter::new();
        completer.push(Err(ProviderError::BackendUnavailable("down".to_string())));
        let mut session = session_with(
            completer,
            Arc::new(RecordingSummarizer::default()),
            seeded(),
        );

        assert!(session.submit("hello").await.is_err());
        session.clear();

        assert_eq!(session.log().len(), 1);
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.latest_summary(), None);
    }

    #[tokio::test]
    async fn test_empty_submit_rejected() {
        let completer = ScriptedCompleter::new();
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            unseeded(),
        );

        assert!(session.submit("   ").await.is_err());
        assert!(session.log().is_empty());
        assert_eq!(completer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_mode_uses_default_prompt() {
        let completer = ScriptedCompleter::new();
        let mut session = session_with(
            completer.clone(),
            Arc::new(RecordingSummarizer::default()),
            unseeded(),
        );

        assert_eq!(session.set_mode("Astrologer"), "General Chat");
        session.submit("hi").await.unwrap();
        assert!(completer
            .last_prompt()
            .starts_with("You are a helpful and friendly AI assistant."));
    }

    #[tokio::test]
    async fn test_events_follow_state_machine() {
        let mut session = session_with(
            ScriptedCompleter::new(),
            Arc::new(RecordingSummarizer::default()),
            unseeded(),
        );
        let mut rx = session.events().take_receiver().unwrap();

        session.submit("hi").await.unwrap();

        let mut states = Vec::new();
        let mut appended = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                SessionEvent::StateChanged { state, .. } => states.push(state),
                SessionEvent::TurnAppended { index, turn, .. } => {
                    appended.push((index, turn.role()))
                }
                _ => {}
            }
        }

        assert_eq!(
            states,
            vec![
                SessionState::AwaitingResponse,
                SessionState::ResponseReady,
                SessionState::Idle
            ]
        );
        assert_eq!(appended, vec![(0, Role::User), (1, Role::Assistant)]);
    }

    #[tokio::test]
    async fn test_summarize_now() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let mut session = session_with(
            ScriptedCompleter::new(),
            summarizer.clone(),
            unseeded(),
        );

        assert!(session.summarize_now().await.is_err());
        session.submit("hi").await.unwrap();
        assert_eq!(session.summarize_now().await.unwrap(), "summary 1");
        assert_eq!(
            summarizer.transcripts.lock().unwrap()[0],
            "user: hi\nassistant: reply 1"
        );
    }
}
