//! Sources of payload pages

mod rest;

use std::collections::VecDeque;

use serde_json::Value;

use crate::error::Result;
use crate::payload::{payloads_from_array, Payload};

pub use rest::{parse_next_link, RestPages};

/// Producer of decoded payload pages, fetched one at a time.
///
/// A page is only returned once every payload in it has decoded, so a
/// cancelled fetch never hands partial data to the sync driver.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// The next page, or `None` when the listing is exhausted.
    async fn next_page(&mut self) -> Result<Option<Vec<Payload>>>;
}

/// Pages held in memory, e.g. read from an export file.
#[derive(Debug, Clone, Default)]
pub struct MemoryPages {
    pages: VecDeque<Vec<Payload>>,
}

impl MemoryPages {
    pub fn new(pages: Vec<Vec<Payload>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }

    /// Parse pages from JSON text.
    ///
    /// Accepts a single object (one page of one), an array of objects (one
    /// page) or an array of arrays of objects (one page each).
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;

        let pages = match value {
            Value::Array(items) if items.is_empty() => Vec::new(),
            Value::Array(items) if items.iter().all(Value::is_array) => items
                .into_iter()
                .map(payloads_from_array)
                .collect::<std::result::Result<Vec<_>, _>>()?,
            Value::Array(items) => vec![payloads_from_array(Value::Array(items))?],
            other => vec![vec![Payload::try_from(other)?]],
        };

        Ok(Self::new(pages))
    }

    /// Pages not yet handed out
    pub fn remaining(&self) -> usize {
        self.pages.len()
    }
}

impl PageSource for MemoryPages {
    async fn next_page(&mut self) -> Result<Option<Vec<Payload>>> {
        Ok(self.pages.pop_front())
    }
}
