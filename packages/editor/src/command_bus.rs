//! # Command Bus
//!
//! Lets a detached control panel reach page-scoped override setters.
//!
//! Pages register a handler for their scope when they mount and
//! unregister it when they unmount. The panel only knows the bus and the
//! scope of the page it is editing.

use retouch_overrides::{OverrideKey, StyleProperty};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Edit request sent by the control panel
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetStyle {
        scope: String,
        key: OverrideKey,
        property: StyleProperty,
        value: String,
    },

    SetContent {
        scope: String,
        entity_id: String,
        field: String,
        value: Value,
    },

    /// Drop every override the page owns
    ResetOverrides { scope: String },
}

impl Command {
    pub fn scope(&self) -> &str {
        match self {
            Command::SetStyle { scope, .. } => scope,
            Command::SetContent { scope, .. } => scope,
            Command::ResetOverrides { scope } => scope,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SetStyle { .. } => "SetStyle",
            Command::SetContent { .. } => "SetContent",
            Command::ResetOverrides { .. } => "ResetOverrides",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BusError {
    #[error("No handler registered for scope: {0}")]
    NoHandler(String),
}

/// Returns `true` when the handler applied the command
type Handler = Box<dyn FnMut(&Command) -> bool>;

struct Registration {
    id: HandlerId,
    scope: String,
    handler: Handler,
}

#[derive(Default)]
pub struct CommandBus {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for commands of `scope` (on page mount)
    pub fn register(
        &mut self,
        scope: impl Into<String>,
        handler: impl FnMut(&Command) -> bool + 'static,
    ) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        let scope = scope.into();
        debug!(handler = %id, scope = %scope, "Registered command handler");

        self.registrations.push(Registration {
            id,
            scope,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a handler (on page unmount). Returns whether it was registered.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        before != self.registrations.len()
    }

    /// Deliver `command` to every handler of its scope.
    ///
    /// Returns how many handlers applied it.
    pub fn dispatch(&mut self, command: &Command) -> Result<usize, BusError> {
        let scope = command.scope();
        let mut delivered = 0;
        let mut handled = 0;

        for registration in self.registrations.iter_mut().filter(|r| r.scope == scope) {
            delivered += 1;
            if (registration.handler)(command) {
                handled += 1;
            }
        }

        if delivered == 0 {
            return Err(BusError::NoHandler(scope.to_string()));
        }

        debug!(command = command.name(), scope, handled, "Dispatched command");
        Ok(handled)
    }

    pub fn handler_count(&self, scope: &str) -> usize {
        self.registrations.iter().filter(|r| r.scope == scope).count()
    }
}

impl fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBus")
            .field("handlers", &self.registrations.len())
            .finish()
    }
}
