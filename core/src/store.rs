use std::collections::HashSet;

use crate::error::Result;

/// Key prefix for a term's posting set.
pub const URL_SET_PREFIX: &str = "URLSet:";
/// Key prefix for a document's term counter hash.
pub const TERM_COUNTER_PREFIX: &str = "TermCounter:";

/// Store key for the posting set of `term`.
pub fn url_set_key(term: &str) -> String {
    format!("{URL_SET_PREFIX}{term}")
}

/// Store key for the term counter of `url`.
pub fn term_counter_key(url: &str) -> String {
    format!("{TERM_COUNTER_PREFIX}{url}")
}

/// One store command queued into a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddToSet {
        key: String,
        member: String,
    },
    SetField {
        key: String,
        field: String,
        value: String,
    },
    GetField {
        key: String,
        field: String,
    },
    Delete {
        key: String,
    },
}

/// Result of one executed [`Command`], in queue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledged write (set add, field set, delete).
    Done,
    /// Field read; `None` when the key or field is absent.
    Field(Option<String>),
}

/// Commands accumulated for a single atomic round-trip.
#[derive(Debug, Default)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an idempotent membership add on a set key.
    pub fn add_to_set(&mut self, key: &str, member: &str) {
        self.commands.push(Command::AddToSet {
            key: key.to_string(),
            member: member.to_string(),
        });
    }

    /// Queues a scalar field upsert on a hash key.
    pub fn set_field(&mut self, key: &str, field: &str, value: &str) {
        self.commands.push(Command::SetField {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    /// Queues a field read; the matching reply is [`Reply::Field`].
    pub fn get_field(&mut self, key: &str, field: &str) {
        self.commands.push(Command::GetField {
            key: key.to_string(),
            field: field.to_string(),
        });
    }

    /// Queues a key delete.
    pub fn delete(&mut self, key: &str) {
        self.commands.push(Command::Delete {
            key: key.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

/// Capability surface the index core needs from a key-value store.
///
/// Any store offering idempotent set membership, per-key field tables,
/// pattern key scans, and atomic multi-command transactions satisfies the
/// contract. Methods take `&mut self` because real connections are
/// stateful. No method retries; retry policy belongs to the caller.
pub trait Store {
    fn add_to_set(&mut self, key: &str, member: &str) -> Result<()>;

    fn set_field(&mut self, key: &str, field: &str, value: &str) -> Result<()>;

    fn get_field(&mut self, key: &str, field: &str) -> Result<Option<String>>;

    fn members_of(&mut self, key: &str) -> Result<HashSet<String>>;

    fn keys_matching(&mut self, pattern: &str) -> Result<HashSet<String>>;

    fn exists(&mut self, key: &str) -> Result<bool>;

    /// Runs every queued command as a single atomic unit and returns one
    /// [`Reply`] per command, in queue order. Readers never observe partial
    /// execution. An empty transaction succeeds without a round-trip.
    fn exec(&mut self, tx: Transaction) -> Result<Vec<Reply>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_carry_their_prefix() {
        assert_eq!(url_set_key("java"), "URLSet:java");
        assert_eq!(
            term_counter_key("https://example.com/a"),
            "TermCounter:https://example.com/a"
        );
    }

    #[test]
    fn transaction_preserves_queue_order() {
        let mut tx = Transaction::new();
        tx.add_to_set("URLSet:java", "https://example.com/a");
        tx.set_field("TermCounter:https://example.com/a", "java", "3");
        tx.get_field("TermCounter:https://example.com/a", "java");
        tx.delete("URLSet:java");

        assert_eq!(tx.len(), 4);
        let commands = tx.into_commands();
        assert!(matches!(commands[0], Command::AddToSet { .. }));
        assert!(matches!(commands[1], Command::SetField { .. }));
        assert!(matches!(commands[2], Command::GetField { .. }));
        assert!(matches!(commands[3], Command::Delete { .. }));
    }

    #[test]
    fn new_transaction_is_empty() {
        assert!(Transaction::new().is_empty());
    }
}
