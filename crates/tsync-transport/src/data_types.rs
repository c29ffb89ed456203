//! Message type name resolution.
//!
//! The wider messaging system assigns numeric identifiers to message type
//! names at configuration time. Components that publish resolve their type
//! by name through a table handed to them at construction; there is no
//! global registry singleton.

use crate::frame::MessageTypeId;
use std::collections::HashMap;

/// Table mapping message type names to their numeric identifiers.
#[derive(Debug, Default)]
pub struct DataTypeTable {
    by_name: HashMap<String, MessageTypeId>,
}

impl DataTypeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type name. Re-registering a name overwrites its identifier.
    pub fn register(&mut self, name: &str, id: MessageTypeId) {
        self.by_name.insert(name.to_string(), id);
    }

    /// Look up the identifier for a type name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<MessageTypeId> {
        self.by_name.get(name).copied()
    }
}
