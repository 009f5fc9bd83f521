//! Cyber-Santa chat: message history, request gating and the remote responder.

mod models;
pub mod prompt;
pub mod responder;
pub mod session;

pub use models::{ChatMessage, Role};
pub use responder::{respond_guarded, GeminiResponder, Responder, ResponderError};
pub use session::{ChatPhase, ChatRequest, ChatSession, SubmitRejected, FALLBACK_REPLY, GREETING};
