use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::store::{Command, Reply, Store, Transaction};

/// In-process [`Store`] with the same observable semantics as Redis, for
/// tests and offline development.
///
/// Pattern matching covers the literal and trailing-`*` forms the index
/// uses; a full glob engine is not needed. Keys iterate in sorted order,
/// which keeps scans deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: BTreeMap<String, Entry>,
}

#[derive(Debug)]
enum Entry {
    Set(BTreeSet<String>),
    Hash(BTreeMap<String, String>),
}

fn wrong_type(key: &str) -> Error {
    Error::Backend(format!("key {key:?} holds the wrong kind of value"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_entry(&mut self, key: &str) -> Result<&mut BTreeSet<String>> {
        match self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(set) => Ok(set),
            Entry::Hash(_) => Err(wrong_type(key)),
        }
    }

    fn hash_entry(&mut self, key: &str) -> Result<&mut BTreeMap<String, String>> {
        match self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()))
        {
            Entry::Hash(hash) => Ok(hash),
            Entry::Set(_) => Err(wrong_type(key)),
        }
    }

    fn apply(&mut self, command: &Command) -> Result<Reply> {
        match command {
            Command::AddToSet { key, member } => {
                self.set_entry(key)?.insert(member.clone());
                Ok(Reply::Done)
            }
            Command::SetField { key, field, value } => {
                self.hash_entry(key)?.insert(field.clone(), value.clone());
                Ok(Reply::Done)
            }
            Command::GetField { key, field } => {
                let value = match self.data.get(key) {
                    Some(Entry::Hash(hash)) => hash.get(field).cloned(),
                    Some(Entry::Set(_)) => return Err(wrong_type(key)),
                    None => None,
                };
                Ok(Reply::Field(value))
            }
            Command::Delete { key } => {
                self.data.remove(key);
                Ok(Reply::Done)
            }
        }
    }
}

impl Store for MemoryStore {
    fn add_to_set(&mut self, key: &str, member: &str) -> Result<()> {
        self.set_entry(key)?.insert(member.to_string());
        Ok(())
    }

    fn set_field(&mut self, key: &str, field: &str, value: &str) -> Result<()> {
        self.hash_entry(key)?
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    fn get_field(&mut self, key: &str, field: &str) -> Result<Option<String>> {
        match self.data.get(key) {
            Some(Entry::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(Entry::Set(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    fn members_of(&mut self, key: &str) -> Result<HashSet<String>> {
        match self.data.get(key) {
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(Entry::Hash(_)) => Err(wrong_type(key)),
            None => Ok(HashSet::new()),
        }
    }

    fn keys_matching(&mut self, pattern: &str) -> Result<HashSet<String>> {
        let keys = match pattern.strip_suffix('*') {
            Some(prefix) => self
                .data
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect(),
            None => self
                .data
                .keys()
                .filter(|key| key.as_str() == pattern)
                .cloned()
                .collect(),
        };
        Ok(keys)
    }

    fn exists(&mut self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }

    fn exec(&mut self, tx: Transaction) -> Result<Vec<Reply>> {
        // Single-process store: applying in queue order is already atomic
        // with respect to other callers.
        let commands = tx.into_commands();
        let mut replies = Vec::with_capacity(commands.len());
        for command in &commands {
            replies.push(self.apply(command)?);
        }
        Ok(replies)
    }
}
