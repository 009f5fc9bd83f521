//! Session transcript and the single in-flight request gate.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::{ChatMessage, Responder, ResponderError, Role};

/// Seed message shown when a session starts.
pub const GREETING: &str =
    "Ho Ho Ho! It's Cyber-Santa here. Want some cheat codes for the nice list?";

/// Reply substituted when the responder fails.
pub const FALLBACK_REPLY: &str = "My servers are frozen solid! Try again later, gamer.";

/// Whether a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// Ready for a new submission.
    Idle,
    /// One request is in flight; submissions are rejected.
    AwaitingReply,
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    /// Blank input.
    #[error("message is empty")]
    Empty,
    /// A previous request has not settled yet.
    #[error("Cyber-Santa is still typing")]
    Busy,
}

/// Everything the responder needs for one reply.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Transcript before the new message, oldest first.
    pub history: Vec<ChatMessage>,
    /// The new user text.
    pub text: String,
}

/// In-memory chat transcript for one run of the app.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    phase: ChatPhase,
    last_id: i64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Start a session seeded with the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new("init", Role::Model, GREETING)],
            phase: ChatPhase::Idle,
            last_id: 0,
        }
    }

    /// Messages in conversation order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Current request phase.
    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Whether a reply is pending.
    pub fn is_awaiting(&self) -> bool {
        self.phase == ChatPhase::AwaitingReply
    }

    /// Append the user's message and hand back the request to send.
    ///
    /// The returned request carries the transcript as it was before `text`
    /// was appended.
    pub fn submit(&mut self, text: &str) -> Result<ChatRequest, SubmitRejected> {
        if text.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }
        if self.is_awaiting() {
            warn!("Rejecting chat submission while a reply is pending");
            return Err(SubmitRejected::Busy);
        }

        let history = self.messages.clone();
        self.push(Role::User, text.to_string());
        self.phase = ChatPhase::AwaitingReply;
        info!(history = history.len(), "Chat message submitted");

        Ok(ChatRequest {
            history,
            text: text.to_string(),
        })
    }

    /// Settle the outstanding request, appending the reply or the fallback.
    ///
    /// Returns `None` when no request was outstanding.
    pub fn resolve(&mut self, outcome: Result<String, ResponderError>) -> Option<&ChatMessage> {
        if !self.is_awaiting() {
            warn!("Ignoring chat reply with no request outstanding");
            return None;
        }
        Some(self.settle(outcome))
    }

    /// Submit `text`, wait for `responder` and resolve in one step.
    ///
    /// Dropping the future before the reply arrives settles the request with
    /// the fallback reply, so the session never stays busy.
    pub async fn exchange<R: Responder>(
        &mut self,
        text: &str,
        responder: &R,
    ) -> Result<&ChatMessage, SubmitRejected> {
        let request = self.submit(text)?;
        let outcome = {
            let pending = PendingReply { session: &mut *self };
            let outcome = responder.respond(&request).await;
            pending.disarm();
            outcome
        };
        Ok(self.settle(outcome))
    }

    fn settle(&mut self, outcome: Result<String, ResponderError>) -> &ChatMessage {
        self.phase = ChatPhase::Idle;
        let text = match outcome {
            Ok(reply) => {
                info!(chars = reply.chars().count(), "Chat reply received");
                reply
            }
            Err(err) => {
                error!("Chat responder failed: {err}");
                FALLBACK_REPLY.to_string()
            }
        };
        self.push(Role::Model, text)
    }

    fn push(&mut self, role: Role, text: String) -> &ChatMessage {
        let id = self.next_id();
        self.messages.push(ChatMessage::new(id, role, text));
        &self.messages[self.messages.len() - 1]
    }

    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id.to_string()
    }
}

/// Settles an outstanding request if the awaiting future is dropped.
struct PendingReply<'a> {
    session: &'a mut ChatSession,
}

impl PendingReply<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.session.is_awaiting() {
            self.session.settle(Err(ResponderError::Aborted(
                "reply abandoned before completion".to_string(),
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        future::Future,
        sync::atomic::{AtomicUsize, Ordering},
    };

    struct Scripted {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Responder for Scripted {
        fn respond(
            &self,
            _request: &ChatRequest,
        ) -> impl Future<Output = Result<String, ResponderError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self
                .reply
                .map(str::to_string)
                .ok_or(ResponderError::EmptyReply);
            async move { outcome }
        }
    }

    #[test]
    fn session_starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Model);
        assert_eq!(session.messages()[0].text, GREETING);
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn blank_submission_is_rejected() {
        let mut session = ChatSession::new();
        assert_eq!(session.submit("   ").unwrap_err(), SubmitRejected::Empty);
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_awaiting());
    }

    #[test]
    fn submit_appends_user_message_and_carries_prior_history() {
        let mut session = ChatSession::new();
        let request = session.submit("hi").unwrap();

        assert_eq!(request.text, "hi");
        assert_eq!(request.history.len(), 1);
        assert_eq!(request.history[0].text, GREETING);
        assert_eq!(session.messages().len(), 2);
        assert!(session.messages()[1].is_user());
        assert!(session.is_awaiting());
    }

    #[test]
    fn second_submit_while_awaiting_is_rejected() {
        let mut session = ChatSession::new();
        session.submit("first").unwrap();
        assert_eq!(session.submit("second").unwrap_err(), SubmitRejected::Busy);
        assert_eq!(session.messages().len(), 2);

        session.resolve(Ok("reply".to_string()));
        assert!(session.submit("second").is_ok());
    }

    #[test]
    fn failure_appends_fallback_and_reopens() {
        let mut session = ChatSession::new();
        session.submit("hi").unwrap();
        let reply = session
            .resolve(Err(ResponderError::EmptyReply))
            .expect("reply appended");
        assert_eq!(reply.role, Role::Model);
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn stray_resolution_is_ignored() {
        let mut session = ChatSession::new();
        assert!(session.resolve(Ok("late".to_string())).is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn message_ids_increase() {
        let mut session = ChatSession::new();
        for text in ["a", "b", "c"] {
            session.submit(text).unwrap();
            session.resolve(Ok("ok".to_string()));
        }
        let ids: Vec<i64> = session.messages()[1..]
            .iter()
            .map(|message| message.id.parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn exchange_yields_three_messages() {
        let responder = Scripted::replying("gg, noob-proof pick: Excel Math Racer!");
        let mut session = ChatSession::new();

        let reply = session.exchange("hi", &responder).await.unwrap();
        assert_eq!(reply.text, "gg, noob-proof pick: Excel Math Racer!");

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
        assert_eq!(session.messages()[1].text, "hi");
        assert_eq!(responder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exchange_falls_back_on_failure() {
        let responder = Scripted::failing();
        let mut session = ChatSession::new();

        session.exchange("hi", &responder).await.unwrap();
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].text, FALLBACK_REPLY);
        assert!(!session.is_awaiting());
    }

    struct Stalled;

    impl Responder for Stalled {
        fn respond(
            &self,
            _request: &ChatRequest,
        ) -> impl Future<Output = Result<String, ResponderError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn abandoned_exchange_reopens_session() {
        let mut session = ChatSession::new();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            session.exchange("hi", &Stalled),
        )
        .await;
        assert!(outcome.is_err(), "stalled responder should time out");

        assert_eq!(session.phase(), ChatPhase::Idle);
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].text, FALLBACK_REPLY);
        assert!(session.submit("again").is_ok());
    }

    #[tokio::test]
    async fn exchange_rejects_blank_without_calling_responder() {
        let responder = Scripted::replying("unused");
        let mut session = ChatSession::new();

        assert_eq!(
            session.exchange(" ", &responder).await.unwrap_err(),
            SubmitRejected::Empty
        );
        assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
    }
}
