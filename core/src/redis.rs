use std::collections::HashSet;

use redis::{Commands, Connection};

use crate::error::Result;
use crate::store::{Command, Reply, Store, Transaction};

/// Production [`Store`] over a synchronous Redis connection.
///
/// Transactions map to MULTI/EXEC pipelines. The adapter performs no
/// retries of its own; transport failures propagate to the caller.
pub struct RedisStore {
    con: Connection,
}

impl RedisStore {
    /// Connects to a Redis endpoint, e.g. `redis://127.0.0.1/`.
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let con = client.get_connection()?;
        Ok(Self { con })
    }

    /// Wraps an existing connection.
    pub fn new(con: Connection) -> Self {
        Self { con }
    }
}

impl Store for RedisStore {
    fn add_to_set(&mut self, key: &str, member: &str) -> Result<()> {
        let _: () = self.con.sadd(key, member)?;
        Ok(())
    }

    fn set_field(&mut self, key: &str, field: &str, value: &str) -> Result<()> {
        let _: () = self.con.hset(key, field, value)?;
        Ok(())
    }

    fn get_field(&mut self, key: &str, field: &str) -> Result<Option<String>> {
        Ok(self.con.hget(key, field)?)
    }

    fn members_of(&mut self, key: &str) -> Result<HashSet<String>> {
        Ok(self.con.smembers(key)?)
    }

    fn keys_matching(&mut self, pattern: &str) -> Result<HashSet<String>> {
        Ok(self.con.keys(pattern)?)
    }

    fn exists(&mut self, key: &str) -> Result<bool> {
        Ok(self.con.exists(key)?)
    }

    fn exec(&mut self, tx: Transaction) -> Result<Vec<Reply>> {
        let commands = tx.into_commands();
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in &commands {
            match command {
                Command::AddToSet { key, member } => {
                    pipe.sadd(key, member);
                }
                Command::SetField { key, field, value } => {
                    pipe.hset(key, field, value);
                }
                Command::GetField { key, field } => {
                    pipe.hget(key, field);
                }
                Command::Delete { key } => {
                    pipe.del(key);
                }
            }
        }

        let values: Vec<redis::Value> = pipe.query(&mut self.con)?;
        tracing::trace!(queued = commands.len(), replies = values.len(), "EXEC");

        let mut replies = Vec::with_capacity(values.len());
        for (command, value) in commands.iter().zip(values) {
            let reply = match command {
                Command::GetField { .. } => Reply::Field(redis::from_redis_value(&value)?),
                _ => Reply::Done,
            };
            replies.push(reply);
        }
        Ok(replies)
    }
}
