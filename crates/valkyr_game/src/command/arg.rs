//! Parsed invocation context handed to command methods.

use crate::session::Session;
use std::sync::Arc;

/// Positional arguments plus the resolved invoker and target sessions.
///
/// The target defaults to the invoker; an explicit `@uid` mention in the
/// invocation rebinds it to another online player before the method runs.
pub struct CommandArg {
    pub invoker: Arc<Session>,
    pub target: Arc<Session>,
    tokens: Vec<String>,
}

impl CommandArg {
    pub fn new(invoker: Arc<Session>, target: Arc<Session>, tokens: Vec<String>) -> Self {
        Self {
            invoker,
            target,
            tokens,
        }
    }

    /// Integer argument at `pos`; missing or unparsable tokens fall back
    /// to 0 so callers apply their own range policy instead of failing.
    pub fn get_int(&self, pos: usize) -> i64 {
        self.tokens
            .get(pos)
            .and_then(|t| t.parse().ok())
            .unwrap_or(0)
    }

    /// String argument at `pos`, if present.
    pub fn get_str(&self, pos: usize) -> Option<&str> {
        self.tokens.get(pos).map(String::as_str)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Replies to the invoker on the system chat channel.
    pub fn send_msg(&self, text: &str) {
        self.invoker.send_text(text);
    }
}
