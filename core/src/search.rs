use std::collections::HashMap;

use crate::error::Result;
use crate::index::Index;
use crate::store::Store;

/// Comparator direction for [`SearchResult::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Immutable mapping from URL to relevance score.
///
/// Built from a single-term lookup or by combining two existing results.
/// Safe to hand out freely once constructed; combinators always allocate a
/// new result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    map: HashMap<String, u64>,
}

/// Default merge policy: summed term frequency.
fn sum_relevance(a: u64, b: u64) -> u64 {
    a + b
}

impl SearchResult {
    /// Runs a single-term query against `index`.
    pub fn search<S: Store>(index: &mut Index<S>, term: &str) -> Result<Self> {
        Ok(Self::from_counts(index.counts_for(term)?))
    }

    pub fn from_counts(map: HashMap<String, u64>) -> Self {
        Self { map }
    }

    /// Relevance of `url`, 0 when absent. Total: never fails.
    pub fn relevance(&self, url: &str) -> u64 {
        self.map.get(url).copied().unwrap_or(0)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.map.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.map.iter().map(|(url, &score)| (url.as_str(), score))
    }

    /// Intersection of both results, scores merged by summing.
    pub fn and(&self, that: &SearchResult) -> SearchResult {
        self.and_with(that, sum_relevance)
    }

    /// Intersection with an explicit merge policy. The policy is the
    /// extension seam for relevance models beyond summed frequency.
    pub fn and_with(
        &self,
        that: &SearchResult,
        merge: impl Fn(u64, u64) -> u64,
    ) -> SearchResult {
        let map = self
            .map
            .iter()
            .filter(|(url, _)| that.contains(url))
            .map(|(url, &score)| (url.clone(), merge(score, that.relevance(url))))
            .collect();
        SearchResult { map }
    }

    /// Union of both results, scores merged by summing.
    pub fn or(&self, that: &SearchResult) -> SearchResult {
        self.or_with(that, sum_relevance)
    }

    /// Union with an explicit merge policy; every key merges both sides'
    /// scores, absent sides contributing 0.
    pub fn or_with(&self, that: &SearchResult, merge: impl Fn(u64, u64) -> u64) -> SearchResult {
        let mut map = HashMap::with_capacity(self.map.len() + that.map.len());
        for url in self.map.keys().chain(that.map.keys()) {
            map.entry(url.clone())
                .or_insert_with(|| merge(self.relevance(url), that.relevance(url)));
        }
        SearchResult { map }
    }

    /// Difference: URLs in `self` absent from `that`, scores unchanged.
    pub fn minus(&self, that: &SearchResult) -> SearchResult {
        let map = self
            .map
            .iter()
            .filter(|(url, _)| !that.contains(url))
            .map(|(url, &score)| (url.clone(), score))
            .collect();
        SearchResult { map }
    }

    /// Entries ordered by score in the given direction, ties broken by URL
    /// ascending so equal scores always list the same way.
    pub fn rank(&self, order: SortOrder) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|(url, &score)| (url.clone(), score))
            .collect();
        entries.sort_by(|a, b| {
            let by_score = match order {
                SortOrder::Ascending => a.1.cmp(&b.1),
                SortOrder::Descending => b.1.cmp(&a.1),
            };
            by_score.then_with(|| a.0.cmp(&b.0))
        });
        entries
    }
}
