use std::collections::HashSet;

use wikidex_core::{
    Error, Index, MemoryStore, Reply, Result, SearchResult, Store, TermCounts, Transaction,
};

const URL1: &str = "https://en.wikipedia.org/wiki/Java_(programming_language)";
const URL2: &str = "https://en.wikipedia.org/wiki/Programming_language";

fn counts(pairs: &[(&str, u64)]) -> TermCounts {
    pairs
        .iter()
        .map(|(term, count)| (term.to_string(), *count))
        .collect()
}

fn loaded_index() -> Index<MemoryStore> {
    let mut index = Index::new(MemoryStore::new());
    index
        .index_document(
            URL1,
            &counts(&[("the", 339), ("java", 59), ("programming", 46)]),
        )
        .unwrap();
    index
        .index_document(URL2, &counts(&[("the", 264), ("programming", 126)]))
        .unwrap();
    index
}

#[test]
fn urls_for_unknown_term_is_empty() {
    let mut index = loaded_index();
    assert!(index.urls_for("SOME_RANDOM_TERM").unwrap().is_empty());
}

#[test]
fn urls_for_returns_every_matching_document() {
    let mut index = loaded_index();
    let expected: HashSet<String> = [URL1, URL2].iter().map(|u| u.to_string()).collect();
    assert_eq!(index.urls_for("the").unwrap(), expected);

    let only_first: HashSet<String> = [URL1.to_string()].into_iter().collect();
    assert_eq!(index.urls_for("java").unwrap(), only_first);
}

#[test]
fn counts_for_returns_per_url_counts() {
    let mut index = loaded_index();
    let map = index.counts_for("the").unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[URL1], 339);
    assert_eq!(map[URL2], 264);
}

#[test]
fn counts_for_unknown_term_is_empty_not_a_fault() {
    let mut index = loaded_index();
    assert!(index.counts_for("SOME_RANDOM_TERM").unwrap().is_empty());
}

#[test]
fn count_of_missing_data_is_zero() {
    let mut index = loaded_index();
    assert_eq!(index.count_of(URL1, "SOME_RANDOM_TERM").unwrap(), 0);
    assert_eq!(index.count_of("https://nowhere.invalid/", "the").unwrap(), 0);
}

#[test]
fn count_of_unparsable_value_is_zero_on_both_paths() {
    let mut store = MemoryStore::new();
    store.add_to_set("URLSet:java", URL1).unwrap();
    store
        .set_field(&format!("TermCounter:{URL1}"), "java", "not-a-number")
        .unwrap();

    let mut index = Index::new(store);
    assert_eq!(index.count_of(URL1, "java").unwrap(), 0);
    assert_eq!(index.counts_for("java").unwrap()[URL1], 0);
}

#[test]
fn is_indexed_tracks_term_counter_keys() {
    let mut index = loaded_index();
    assert!(index.is_indexed(URL1).unwrap());
    assert!(!index.is_indexed("https://nowhere.invalid/").unwrap());
}

#[test]
fn indexing_empty_counts_is_a_no_op() {
    let mut index = Index::new(MemoryStore::new());
    index.index_document(URL1, &TermCounts::new()).unwrap();
    assert!(!index.is_indexed(URL1).unwrap());
    assert!(index.term_set().unwrap().is_empty());
}

#[test]
fn reindexing_overwrites_counts_and_keeps_membership() {
    let mut index = loaded_index();
    index.index_document(URL1, &counts(&[("the", 7)])).unwrap();

    assert_eq!(index.count_of(URL1, "the").unwrap(), 7);
    // earlier fields and posting-set membership survive, per set union and
    // field-wise last-write
    assert_eq!(index.count_of(URL1, "java").unwrap(), 59);
    assert!(index.urls_for("java").unwrap().contains(URL1));
    assert!(index.urls_for("the").unwrap().contains(URL1));
}

#[test]
fn search_and_of_itself_doubles_scores() {
    let mut index = loaded_index();
    let the = SearchResult::search(&mut index, "the").unwrap();
    let doubled = the.and(&the);
    assert_eq!(doubled.relevance(URL1), 678);
    assert_eq!(doubled.relevance(URL2), 528);
}

#[test]
fn search_algebra_over_live_lookups() {
    let mut index = loaded_index();
    let programming = SearchResult::search(&mut index, "programming").unwrap();
    let java = SearchResult::search(&mut index, "java").unwrap();

    let both = programming.and(&java);
    assert_eq!(both.len(), 1);
    assert_eq!(both.relevance(URL1), 46 + 59);

    let either = programming.or(&java);
    assert_eq!(either.len(), 2);
    assert_eq!(either.relevance(URL2), 126);

    let without_java = programming.minus(&java);
    assert_eq!(without_java.len(), 1);
    assert_eq!(without_java.relevance(URL2), 126);
}

#[test]
fn missing_counter_field_is_a_fault_in_the_batched_path() {
    let mut store = MemoryStore::new();
    store.add_to_set("URLSet:java", URL1).unwrap();

    let mut index = Index::new(store);
    // tolerant single-key path still reads 0
    assert_eq!(index.count_of(URL1, "java").unwrap(), 0);

    let err = index.counts_for("java").unwrap_err();
    assert!(err.is_consistency_fault());
    match err {
        Error::MissingCount { term, url } => {
            assert_eq!(term, "java");
            assert_eq!(url, URL1);
        }
        other => panic!("expected MissingCount, got {other:?}"),
    }
}

/// Store wrapper that drops the last reply of every transaction, standing
/// in for a store whose pipelining guarantee broke.
struct ShortReplies {
    inner: MemoryStore,
}

impl Store for ShortReplies {
    fn add_to_set(&mut self, key: &str, member: &str) -> Result<()> {
        self.inner.add_to_set(key, member)
    }

    fn set_field(&mut self, key: &str, field: &str, value: &str) -> Result<()> {
        self.inner.set_field(key, field, value)
    }

    fn get_field(&mut self, key: &str, field: &str) -> Result<Option<String>> {
        self.inner.get_field(key, field)
    }

    fn members_of(&mut self, key: &str) -> Result<HashSet<String>> {
        self.inner.members_of(key)
    }

    fn keys_matching(&mut self, pattern: &str) -> Result<HashSet<String>> {
        self.inner.keys_matching(pattern)
    }

    fn exists(&mut self, key: &str) -> Result<bool> {
        self.inner.exists(key)
    }

    fn exec(&mut self, tx: Transaction) -> Result<Vec<Reply>> {
        let mut replies = self.inner.exec(tx)?;
        replies.pop();
        Ok(replies)
    }
}

#[test]
fn short_replies_are_a_count_mismatch() {
    let mut inner = Index::new(MemoryStore::new());
    inner
        .index_document(URL1, &counts(&[("the", 339)]))
        .unwrap();
    inner
        .index_document(URL2, &counts(&[("the", 264)]))
        .unwrap();

    let mut index = Index::new(ShortReplies {
        inner: inner.into_store(),
    });
    let err = index.counts_for("the").unwrap_err();
    assert!(err.is_consistency_fault());
    match err {
        Error::CountMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, 2);
            assert_eq!(actual, 1);
        }
        other => panic!("expected CountMismatch, got {other:?}"),
    }
}

#[test]
fn term_set_strips_key_prefixes() {
    let mut index = loaded_index();
    let expected: HashSet<String> = ["the", "java", "programming"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(index.term_set().unwrap(), expected);
    assert_eq!(index.url_set_keys().unwrap().len(), 3);
    assert_eq!(index.term_counter_keys().unwrap().len(), 2);
}

#[test]
fn flushing_url_sets_leaves_counters() {
    let mut index = loaded_index();
    index.delete_url_sets().unwrap();
    assert!(index.url_set_keys().unwrap().is_empty());
    assert!(index.is_indexed(URL1).unwrap());

    index.delete_term_counters().unwrap();
    assert!(!index.is_indexed(URL1).unwrap());
}

#[test]
fn delete_all_keys_empties_the_store() {
    let mut index = loaded_index();
    index.delete_all_keys().unwrap();
    assert!(index.term_set().unwrap().is_empty());
    assert!(index.term_counter_keys().unwrap().is_empty());
    assert!(!index.is_indexed(URL1).unwrap());
}
