use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Map from normalized term to occurrence count for one document.
pub type TermCounts = HashMap<String, u64>;

/// Counts normalized terms for a single document.
///
/// Normalization is NFKC plus lowercasing; terms are maximal word matches,
/// so punctuation never reaches the index. Stop-word filtering is on by
/// default and uses a built-in set.
#[derive(Debug)]
pub struct TermCounter {
    label: String,
    counts: TermCounts,
    filter_stop_words: bool,
}

impl TermCounter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            counts: TermCounts::new(),
            filter_stop_words: true,
        }
    }

    /// Counts stop words instead of dropping them.
    pub fn keep_stop_words(mut self) -> Self {
        self.filter_stop_words = false;
        self
    }

    /// The document identity this counter belongs to.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Folds one text block into the counts.
    pub fn process_block(&mut self, text: &str) {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        for found in WORD.find_iter(&normalized) {
            let term = found.as_str();
            if self.filter_stop_words && STOPWORDS.contains(term) {
                continue;
            }
            *self.counts.entry(term.to_string()).or_insert(0) += 1;
        }
    }

    /// Folds an ordered sequence of text blocks into the counts.
    pub fn process_blocks<I, B>(&mut self, blocks: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<str>,
    {
        for block in blocks {
            self.process_block(block.as_ref());
        }
    }

    /// Occurrences of `term`, 0 when never seen.
    pub fn get(&self, term: &str) -> u64 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &TermCounts {
        &self.counts
    }

    pub fn into_counts(self) -> TermCounts {
        self.counts
    }
}

/// Counts the terms of `blocks` for the document `label`, filtering stop
/// words. This is the whole extraction contract the index consumes.
pub fn count<I, B>(label: impl Into<String>, blocks: I) -> TermCounter
where
    I: IntoIterator<Item = B>,
    B: AsRef<str>,
{
    let mut counter = TermCounter::new(label);
    counter.process_blocks(blocks);
    counter
}
