//! In-memory stand-ins for the remote service and the cache backend.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::cache::CacheBackend;
use crate::entrez::RecordSource;
use crate::error::{CacheError, RemoteError};
use crate::parse::RecordFormat;
use crate::record::{IdentifierList, Record};

pub fn record(id: &str, name: &str) -> Record {
    Record {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} protein [Arabidopsis thaliana]"),
        sequence: "MKVLAAGT".to_string(),
    }
}

/// Renders records the way the fetch service would return them in GenBank format.
pub fn genbank_payload(records: &[&Record]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "LOCUS       {:<16} {} aa            linear   PLN 01-JAN-2024\n",
            r.name,
            r.sequence.len()
        ));
        out.push_str(&format!("DEFINITION  {}.\n", r.description));
        out.push_str(&format!("ACCESSION   {}\n", r.id));
        out.push_str(&format!("VERSION     {}\n", r.id));
        out.push_str("ORIGIN\n");
        out.push_str(&format!("        1 {}\n", r.sequence.to_lowercase()));
        out.push_str("//\n");
    }
    out
}

/// A `RecordSource` answering from fixed data and recording every call made to it.
#[derive(Default)]
pub struct StubSource {
    search_result: Option<IdentifierList>,
    /// Records served by `fetch_batch`, queued per identifier in the order they were added
    records: RefCell<HashMap<String, VecDeque<Record>>>,
    raw_payload: Option<String>,
    fail_fetch: bool,
    search_calls: RefCell<Vec<(String, usize)>>,
    fetch_calls: RefCell<Vec<String>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_result(mut self, ids: &[&str]) -> Self {
        self.search_result = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_result = None;
        self
    }

    pub fn with_records(self, records: Vec<Record>) -> Self {
        {
            let mut queues = self.records.borrow_mut();
            for r in records {
                queues.entry(r.id.clone()).or_default().push_back(r);
            }
        }
        self
    }

    /// Makes `fetch_batch` return `payload` verbatim, whatever was asked for.
    pub fn with_raw_payload(mut self, payload: &str) -> Self {
        self.raw_payload = Some(payload.to_string());
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn searches(&self) -> Vec<(String, usize)> {
        self.search_calls.borrow().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetch_calls.borrow().clone()
    }
}

impl RecordSource for StubSource {
    fn search(&self, term: &str, max_results: usize) -> Result<IdentifierList, RemoteError> {
        self.search_calls
            .borrow_mut()
            .push((term.to_string(), max_results));

        self.search_result
            .clone()
            .ok_or_else(|| RemoteError::Response("search service unavailable".to_string()))
    }

    fn fetch_batch(&self, ids: &str, format: RecordFormat) -> Result<String, RemoteError> {
        assert_eq!(format, RecordFormat::GenBank, "the stub only serves GenBank");
        self.fetch_calls.borrow_mut().push(ids.to_string());

        if self.fail_fetch {
            return Err(RemoteError::Response("fetch service unavailable".to_string()));
        }
        if let Some(payload) = &self.raw_payload {
            return Ok(payload.clone());
        }

        // unknown identifiers are silently left out, as the real service does
        let mut queues = self.records.borrow_mut();
        let served: Vec<Record> = ids
            .split(',')
            .filter_map(|id| queues.get_mut(id).and_then(|q| q.pop_front()))
            .collect();

        Ok(genbank_payload(&served.iter().collect::<Vec<_>>()))
    }
}

/// A cache kept in an insertion-ordered map.
#[derive(Default, Debug, PartialEq, Eq)]
pub struct MemoryCache {
    entries: IndexMap<String, Vec<u8>>,
}

impl MemoryCache {
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn value(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Stores `value` without going through `store`, e.g. to plant a damaged entry.
    pub fn insert_raw(&mut self, key: &str, value: &[u8]) {
        self.entries.insert(key.to_string(), value.to_vec());
    }
}

impl CacheBackend for MemoryCache {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.as_bytes().to_vec());
        Ok(())
    }
}

/// A `MemoryCache` whose connection drops after a number of successful writes.
pub struct FlakyCache {
    pub inner: MemoryCache,
    pub attempts: usize,
    writes_left: Option<usize>,
}

impl FlakyCache {
    pub fn new(successful_writes: usize) -> Self {
        FlakyCache {
            inner: MemoryCache::default(),
            attempts: 0,
            writes_left: Some(successful_writes),
        }
    }

    pub fn heal(&mut self) {
        self.writes_left = None;
    }

    fn unavailable(key: &str) -> CacheError {
        CacheError::Unavailable {
            backend: "memory://flaky".to_string(),
            key: Some(key.to_string()),
            source: "connection reset by peer".into(),
        }
    }
}

impl CacheBackend for FlakyCache {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self.writes_left {
            Some(0) => Err(Self::unavailable(key)),
            _ => self.inner.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.attempts += 1;
        match self.writes_left {
            Some(0) => Err(Self::unavailable(key)),
            Some(n) => {
                self.writes_left = Some(n - 1);
                self.inner.set(key, value)
            }
            None => self.inner.set(key, value),
        }
    }
}
