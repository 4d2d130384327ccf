//! Document acquisition: fetch a page, cache it on disk, and hand back
//! its text as ordered paragraph blocks.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use sha1::{Digest, Sha1};
use url::Url;

/// Fetches pages as ordered paragraph blocks, politely.
///
/// One fetcher owns its own rate-limiter state and page cache; nothing
/// here is process-global. Requests are spaced at least `min_interval`
/// apart, and every successful download lands in `cache_dir` so reruns
/// can stay off the network.
pub struct PageFetcher {
    client: Client,
    cache_dir: PathBuf,
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl PageFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, min_interval: Duration) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("creating cache dir {}", cache_dir.display()))?;
        let client = Client::builder()
            .user_agent(concat!("wikidex/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(12))
            .build()?;
        Ok(Self {
            client,
            cache_dir,
            min_interval,
            last_request: None,
        })
    }

    /// Downloads `url`, caches the raw HTML, and returns the page's
    /// paragraph blocks in document order. Waits out the minimum interval
    /// since the previous request first.
    pub fn fetch(&mut self, url: &str) -> Result<Vec<String>> {
        let url = normalize(url)?;
        self.throttle();
        tracing::debug!(%url, "fetching");
        let response = self.client.get(url.clone()).send()?.error_for_status()?;
        let html = response.text()?;
        fs::write(self.cache_path(&url), &html).with_context(|| format!("caching {url}"))?;
        Ok(extract_paragraphs(&html))
    }

    /// Reads a previously fetched page from the cache, without touching
    /// the network.
    pub fn read_cached(&self, url: &str) -> Result<Vec<String>> {
        let url = normalize(url)?;
        let path = self.cache_path(&url);
        let html = fs::read_to_string(&path)
            .with_context(|| format!("no cached copy of {url} at {}", path.display()))?;
        Ok(extract_paragraphs(&html))
    }

    /// Like [`PageFetcher::fetch`], but serves from the cache when a copy
    /// exists.
    pub fn fetch_cached(&mut self, url: &str) -> Result<Vec<String>> {
        match self.read_cached(url) {
            Ok(blocks) => {
                tracing::debug!(url, "cache hit");
                Ok(blocks)
            }
            Err(_) => self.fetch(url),
        }
    }

    /// Where `url`'s download lives in the cache.
    pub fn cache_path(&self, url: &Url) -> PathBuf {
        let mut hasher = Sha1::new();
        hasher.update(url.as_str().as_bytes());
        self.cache_dir.join(format!("{:x}.html", hasher.finalize()))
    }

    fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let next = last + self.min_interval;
            let now = Instant::now();
            if now < next {
                thread::sleep(next - now);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Drops the fragment so `page#a` and `page#b` share one cache entry.
pub fn normalize(url: &str) -> Result<Url> {
    let mut url = Url::parse(url).with_context(|| format!("invalid url {url:?}"))?;
    url.set_fragment(None);
    Ok(url)
}

/// Pulls paragraph text out of a page.
///
/// Prefers the marked content element when one exists (`#mw-content-text`
/// on MediaWiki pages) and falls back to every paragraph otherwise.
/// Sidebar and infobox paragraphs are skipped; they repeat navigation
/// text that would pollute term counts.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let content_p = Selector::parse("#mw-content-text p").unwrap();
    let any_p = Selector::parse("p").unwrap();

    let paragraphs = collect_paragraphs(doc.select(&content_p));
    if !paragraphs.is_empty() {
        return paragraphs;
    }
    collect_paragraphs(doc.select(&any_p))
}

fn collect_paragraphs<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .filter(|p| !in_boxout(p))
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

fn in_boxout(p: &ElementRef) -> bool {
    p.ancestors().filter_map(ElementRef::wrap).any(|el| {
        el.value()
            .classes()
            .any(|class| class == "sidebar" || class == "infobox")
    })
}
