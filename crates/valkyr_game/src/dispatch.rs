//! Opcode dispatch table.
//!
//! The table is built once at startup from an explicit registration list
//! (see [`crate::handlers::build_dispatch_table`]) and is read-only for the
//! rest of the process lifetime. Duplicate registration is a configuration
//! error and fatal at startup; an unregistered opcode at runtime is logged
//! and dropped, never fatal.

use crate::context::ServerContext;
use crate::error::ServerError;
use crate::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use valkyr_proto::Frame;

/// One unit of per-opcode behavior.
///
/// A handler receives the live session (never null, though its attached
/// player may be pre-authentication) and the raw header/body bytes of one
/// inbound frame, decodes the body into its expected record, and queues
/// zero or more response packets on the session.
#[async_trait]
pub trait PacketHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &ServerContext,
        session: &Arc<Session>,
        header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError>;
}

/// Opcode → handler registry.
pub struct DispatchTable {
    handlers: HashMap<u16, Arc<dyn PacketHandler>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for a request opcode.
    ///
    /// Registering the same opcode twice is a startup-fatal configuration
    /// error so a bad registration list cannot silently shadow a handler.
    pub fn register(
        &mut self,
        opcode: u16,
        handler: Arc<dyn PacketHandler>,
    ) -> Result<(), ServerError> {
        if self.handlers.insert(opcode, handler).is_some() {
            return Err(ServerError::Config(format!(
                "duplicate handler registration for opcode {opcode}"
            )));
        }
        Ok(())
    }

    /// Routes one inbound frame to its handler.
    ///
    /// Unknown opcodes are logged and dropped: clients on mismatched game
    /// versions send opcodes this server never registered, and that must
    /// not take the connection or the process down. Handler failures are
    /// the per-message failure policy: logged, message abandoned,
    /// connection stays open.
    pub async fn dispatch(&self, ctx: &ServerContext, session: &Arc<Session>, frame: &Frame) {
        let Some(handler) = self.handlers.get(&frame.opcode) else {
            warn!(
                opcode = frame.opcode,
                session = session.id,
                "dropping packet with unregistered opcode"
            );
            return;
        };
        debug!(opcode = frame.opcode, session = session.id, "dispatching packet");
        if let Err(e) = handler
            .handle(ctx, session, &frame.header, &frame.body)
            .await
        {
            warn!(
                opcode = frame.opcode,
                session = session.id,
                "handler failed: {e}"
            );
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::test_context;
    use crate::session::test_support::session_with_channel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PacketHandler for CountingHandler {
        async fn handle(
            &self,
            _ctx: &ServerContext,
            session: &Arc<Session>,
            _header: &[u8],
            _body: &[u8],
        ) -> Result<(), ServerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            session.send_null_rsp(2);
            Ok(())
        }
    }

    #[test]
    fn duplicate_registration_is_fatal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DispatchTable::new();
        table
            .register(1, Arc::new(CountingHandler { calls: calls.clone() }))
            .expect("first registration");
        let err = table
            .register(1, Arc::new(CountingHandler { calls }))
            .expect_err("duplicate must fail");
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn dispatch_invokes_exactly_one_handler() {
        let ctx = test_context();
        let (session, mut rx) = session_with_channel(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DispatchTable::new();
        table
            .register(1, Arc::new(CountingHandler { calls: calls.clone() }))
            .expect("register");

        table
            .dispatch(&ctx, &session, &Frame::new(1, Vec::new()))
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn unknown_opcode_is_dropped_silently() {
        let ctx = test_context();
        let (session, mut rx) = session_with_channel(2);
        let table = DispatchTable::new();

        table
            .dispatch(&ctx, &session, &Frame::new(9999, vec![1, 2, 3]))
            .await;
        // No handler ran and nothing was queued outbound.
        assert!(rx.try_recv().is_err());
    }
}
