use thiserror::Error;

/// Errors surfaced by the index core.
#[derive(Error, Debug)]
pub enum Error {
    /// Batched count retrieval returned a different number of replies than
    /// URLs queried: the posting set and the term counters drifted apart
    /// between staging and execution, or the store broke its transaction
    /// guarantee.
    #[error("term counts per URL don't match for {term:?}: {expected} urls, {actual} replies")]
    CountMismatch {
        term: String,
        expected: usize,
        actual: usize,
    },

    /// A URL is a member of the term's posting set but its counter hash has
    /// no field for that term.
    #[error("no count for term {term:?} at {url} despite posting-set membership")]
    MissingCount { term: String, url: String },

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("backend error: {0}")]
    Backend(String),
}

impl Error {
    /// True for structural divergence between posting sets and term
    /// counters, as opposed to transport failures. Consistency faults are
    /// not worth retrying against the same store state.
    pub fn is_consistency_fault(&self) -> bool {
        matches!(
            self,
            Error::CountMismatch { .. } | Error::MissingCount { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_consistency_faults() {
        let mismatch = Error::CountMismatch {
            term: "java".into(),
            expected: 3,
            actual: 2,
        };
        assert!(mismatch.is_consistency_fault());

        let missing = Error::MissingCount {
            term: "java".into(),
            url: "https://example.com/a".into(),
        };
        assert!(missing.is_consistency_fault());

        assert!(!Error::Backend("boom".into()).is_consistency_fault());
    }

    #[test]
    fn mismatch_reports_expected_and_actual() {
        let err = Error::CountMismatch {
            term: "java".into(),
            expected: 5,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("5 urls"));
        assert!(msg.contains("3 replies"));
    }
}
