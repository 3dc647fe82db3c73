//! The URL batch: built once from CLI arguments or a line-delimited file,
//! then shared read-only by every strategy.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::url_model;

/// Ordered, validated, immutable list of URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBatch {
    urls: Vec<String>,
}

impl UrlBatch {
    /// Validates every URL and rejects an empty batch.
    pub fn new(urls: Vec<String>) -> Result<Self> {
        if urls.is_empty() {
            anyhow::bail!("no URLs to download");
        }
        for (i, url) in urls.iter().enumerate() {
            url_model::validate_url(url).with_context(|| format!("URL #{} '{}'", i + 1, url))?;
        }
        Ok(Self { urls })
    }

    /// Parses one URL per line; lines are trimmed and blank lines ignored.
    pub fn from_lines(text: &str) -> Result<Self> {
        let urls = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(urls)
    }

    /// Reads a UTF-8 URL list file (see [`UrlBatch::from_lines`]).
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read URL list {}", path.display()))?;
        Self::from_lines(&text).with_context(|| format!("URL list {}", path.display()))
    }

    /// Uses `args` when non-empty, otherwise the file at `file`.
    pub fn from_args_or_file(args: &[String], file: &Path) -> Result<Self> {
        if args.is_empty() {
            Self::from_file(file)
        } else {
            Self::new(args.to_vec())
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Filenames written by more than one URL, with those URLs in batch order.
    /// The last URL in the list is not guaranteed to win: completion order decides.
    pub fn duplicate_filenames(&self) -> Vec<(String, Vec<String>)> {
        let mut by_name: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for url in &self.urls {
            if let Some(name) = url_model::last_segment(url) {
                by_name.entry(name).or_default().push(url.clone());
            }
        }
        by_name
            .into_iter()
            .filter(|(_, urls)| urls.len() > 1)
            .map(|(name, urls)| (name.to_string(), urls))
            .collect()
    }
}
