use std::collections::{HashMap, HashSet};

use crate::counter::TermCounts;
use crate::error::{Error, Result};
use crate::store::{self, Reply, Store, Transaction};

/// Term→document inverted index over a remote key-value [`Store`].
///
/// Posting sets live under `URLSet:{term}`, per-document term counts under
/// `TermCounter:{url}`. Both are written in one transaction per indexed
/// document, so readers never see a URL in a posting set without its
/// counter fields for that indexing call.
pub struct Index<S: Store> {
    store: S,
}

impl<S: Store> Index<S> {
    /// Wraps an explicitly constructed store client.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Releases the wrapped store client.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether `url` has been indexed, i.e. its term counter key exists.
    pub fn is_indexed(&mut self, url: &str) -> Result<bool> {
        self.store.exists(&store::term_counter_key(url))
    }

    /// Publishes one document's term counts.
    ///
    /// Every posting-set addition and counter field commits as one atomic
    /// transaction. Re-indexing overwrites counts field by field and leaves
    /// posting-set membership to set union. An empty counts map is a no-op.
    pub fn index_document(&mut self, url: &str, counts: &TermCounts) -> Result<()> {
        let counter_key = store::term_counter_key(url);
        let mut tx = Transaction::new();
        for (term, count) in counts {
            tx.add_to_set(&store::url_set_key(term), url);
            tx.set_field(&counter_key, term, &count.to_string());
        }
        tracing::debug!(url, terms = counts.len(), "indexing document");
        self.store.exec(tx)?;
        Ok(())
    }

    /// The set of URLs whose documents contain `term`. Empty for terms
    /// never indexed.
    pub fn urls_for(&mut self, term: &str) -> Result<HashSet<String>> {
        self.store.members_of(&store::url_set_key(term))
    }

    /// Occurrences of `term` at `url`. Absent counters, absent fields and
    /// unparsable values all read as 0; this path never fails on missing
    /// data.
    pub fn count_of(&mut self, url: &str, term: &str) -> Result<u64> {
        let value = self.store.get_field(&store::term_counter_key(url), term)?;
        Ok(value.as_deref().map_or(0, parse_count))
    }

    /// Counts of `term` for every URL in its posting set, fetched as one
    /// batched transaction instead of one round-trip per URL.
    ///
    /// The reply count must equal the URL count, and every URL must have a
    /// counter field; either violation means the posting set and the
    /// counters drifted apart and surfaces as a consistency fault. A
    /// present but unparsable value degrades to 0.
    pub fn counts_for(&mut self, term: &str) -> Result<HashMap<String, u64>> {
        let mut urls: Vec<String> = self.urls_for(term)?.into_iter().collect();
        urls.sort();

        let mut tx = Transaction::new();
        for url in &urls {
            tx.get_field(&store::term_counter_key(url), term);
        }
        let replies = self.store.exec(tx)?;
        tracing::debug!(term, urls = urls.len(), "batched count lookup");

        if replies.len() != urls.len() {
            return Err(Error::CountMismatch {
                term: term.to_string(),
                expected: urls.len(),
                actual: replies.len(),
            });
        }

        let mut counts = HashMap::with_capacity(urls.len());
        for (url, reply) in urls.into_iter().zip(replies) {
            match reply {
                Reply::Field(Some(value)) => {
                    counts.insert(url, parse_count(&value));
                }
                Reply::Field(None) | Reply::Done => {
                    return Err(Error::MissingCount {
                        term: term.to_string(),
                        url,
                    });
                }
            }
        }
        Ok(counts)
    }

    /// Every term with a posting set. Development and testing aid, not a
    /// query path.
    pub fn term_set(&mut self) -> Result<HashSet<String>> {
        let keys = self.url_set_keys()?;
        Ok(keys
            .iter()
            .filter_map(|key| key.strip_prefix(store::URL_SET_PREFIX))
            .map(str::to_string)
            .collect())
    }

    /// Posting-set keys for every indexed term.
    pub fn url_set_keys(&mut self) -> Result<HashSet<String>> {
        self.store
            .keys_matching(&format!("{}*", store::URL_SET_PREFIX))
    }

    /// Term counter keys for every indexed URL.
    pub fn term_counter_keys(&mut self) -> Result<HashSet<String>> {
        self.store
            .keys_matching(&format!("{}*", store::TERM_COUNTER_PREFIX))
    }

    /// Deletes every posting set in one transaction. Maintenance only.
    pub fn delete_url_sets(&mut self) -> Result<()> {
        let keys = self.url_set_keys()?;
        self.delete_keys(keys)
    }

    /// Deletes every term counter in one transaction. Maintenance only.
    pub fn delete_term_counters(&mut self) -> Result<()> {
        let keys = self.term_counter_keys()?;
        self.delete_keys(keys)
    }

    /// Deletes every key in the store. Maintenance only.
    pub fn delete_all_keys(&mut self) -> Result<()> {
        let keys = self.store.keys_matching("*")?;
        self.delete_keys(keys)
    }

    fn delete_keys(&mut self, keys: HashSet<String>) -> Result<()> {
        let mut tx = Transaction::new();
        for key in &keys {
            tx.delete(key);
        }
        tracing::debug!(deleted = keys.len(), "bulk delete");
        self.store.exec(tx)?;
        Ok(())
    }
}

/// Counter fields are written as decimal integers; anything else reads as
/// 0 rather than failing the lookup.
fn parse_count(value: &str) -> u64 {
    match value.parse() {
        Ok(count) => count,
        Err(_) => {
            tracing::debug!(value, "unparsable term count, reading as 0");
            0
        }
    }
}
