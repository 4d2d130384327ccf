use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use wikidex_core::{counter::TermCounter, Index, RedisStore, SearchResult, SortOrder, Store};
use wikidex_fetcher::PageFetcher;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "wikidex")]
#[command(about = "Build and query a Redis-backed web search index", long_about = None)]
struct Cli {
    /// Redis endpoint
    #[arg(long, global = true, default_value = "redis://127.0.0.1/")]
    redis_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch seed URLs and index their pages
    Build {
        /// Path to a file with URLs to index (one per line)
        #[arg(long)]
        seeds: String,
        /// Directory for cached page downloads
        #[arg(long, default_value = "./page-cache")]
        cache: String,
        /// Minimum milliseconds between network requests
        #[arg(long, default_value_t = 1000)]
        min_interval_ms: u64,
        /// Serve pages from the cache only; fail on misses
        #[arg(long, default_value_t = false)]
        cached_only: bool,
        /// Index stop words too
        #[arg(long, default_value_t = false)]
        keep_stop_words: bool,
        /// Skip URLs that already have a term counter
        #[arg(long, default_value_t = false)]
        skip_indexed: bool,
    },
    /// Look up terms and combine their results
    Search {
        /// Terms to look up, combined left to right
        #[arg(required = true)]
        terms: Vec<String>,
        /// How successive term results combine
        #[arg(long, value_enum, default_value = "and")]
        op: Op,
        /// Rank direction
        #[arg(long, value_enum, default_value = "desc")]
        order: Order,
        /// Emit results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Dump every indexed term with its URLs and counts
    Print,
    /// Delete index data
    Flush {
        #[arg(value_enum)]
        what: FlushTarget,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Op {
    And,
    Or,
    Minus,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

#[derive(Clone, Copy, ValueEnum)]
enum FlushTarget {
    UrlSets,
    TermCounters,
    All,
}

#[derive(Serialize)]
struct Hit<'a> {
    url: &'a str,
    score: u64,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let store = RedisStore::connect(&cli.redis_url)
        .with_context(|| format!("connecting to {}", cli.redis_url))?;
    let mut index = Index::new(store);

    match cli.command {
        Commands::Build {
            seeds,
            cache,
            min_interval_ms,
            cached_only,
            keep_stop_words,
            skip_indexed,
        } => build(
            &mut index,
            &seeds,
            &cache,
            min_interval_ms,
            cached_only,
            keep_stop_words,
            skip_indexed,
        ),
        Commands::Search {
            terms,
            op,
            order,
            json,
        } => search(&mut index, &terms, op, order, json),
        Commands::Print => print_index(&mut index),
        Commands::Flush { what } => flush(&mut index, what),
    }
}

fn build<S: Store>(
    index: &mut Index<S>,
    seeds: &str,
    cache: &str,
    min_interval_ms: u64,
    cached_only: bool,
    keep_stop_words: bool,
    skip_indexed: bool,
) -> Result<()> {
    let mut fetcher = PageFetcher::new(cache, Duration::from_millis(min_interval_ms))?;
    let mut indexed = 0usize;

    let seeds_file = File::open(seeds).with_context(|| format!("opening {seeds}"))?;
    for line in BufReader::new(seeds_file).lines() {
        let url = line?.trim().to_string();
        if url.is_empty() || url.starts_with('#') {
            continue;
        }
        if skip_indexed && index.is_indexed(&url)? {
            tracing::info!(url, "already indexed, skipping");
            continue;
        }

        let blocks = if cached_only {
            fetcher.read_cached(&url)?
        } else {
            fetcher.fetch_cached(&url)?
        };

        let mut counter = TermCounter::new(url.as_str());
        if keep_stop_words {
            counter = counter.keep_stop_words();
        }
        counter.process_blocks(&blocks);
        let counts = counter.into_counts();

        tracing::info!(url, blocks = blocks.len(), terms = counts.len(), "indexing");
        index.index_document(&url, &counts)?;
        indexed += 1;
    }

    tracing::info!(indexed, "build complete");
    Ok(())
}

fn search<S: Store>(
    index: &mut Index<S>,
    terms: &[String],
    op: Op,
    order: Order,
    json: bool,
) -> Result<()> {
    ensure!(!terms.is_empty(), "no search terms given");

    let mut result = SearchResult::search(index, &terms[0])?;
    for term in &terms[1..] {
        let next = SearchResult::search(index, term)?;
        result = match op {
            Op::And => result.and(&next),
            Op::Or => result.or(&next),
            Op::Minus => result.minus(&next),
        };
    }

    let order = match order {
        Order::Asc => SortOrder::Ascending,
        Order::Desc => SortOrder::Descending,
    };
    let ranked = result.rank(order);

    if json {
        let hits: Vec<Hit> = ranked
            .iter()
            .map(|(url, score)| Hit { url, score: *score })
            .collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        for (url, score) in &ranked {
            println!("{score:>8}  {url}");
        }
        tracing::info!(hits = ranked.len(), "search complete");
    }
    Ok(())
}

fn print_index<S: Store>(index: &mut Index<S>) -> Result<()> {
    let mut terms: Vec<String> = index.term_set()?.into_iter().collect();
    terms.sort();
    for term in terms {
        println!("{term}");
        // BTreeMap so URLs list in a stable order
        let counts: BTreeMap<String, u64> = index.counts_for(&term)?.into_iter().collect();
        for (url, count) in counts {
            println!("    {url} {count}");
        }
    }
    Ok(())
}

fn flush<S: Store>(index: &mut Index<S>, what: FlushTarget) -> Result<()> {
    match what {
        FlushTarget::UrlSets => index.delete_url_sets()?,
        FlushTarget::TermCounters => index.delete_term_counters()?,
        FlushTarget::All => index.delete_all_keys()?,
    }
    tracing::info!("flush complete");
    Ok(())
}
