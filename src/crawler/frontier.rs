//! The dispatch gate of a run
//!
//! Every URL passes [`Frontier::try_claim`] before it is fetched. The first
//! claim of a (normalized) URL wins; every later claim, from any worker, for
//! the rest of the run, loses.

use crate::url::frontier_key;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct FrontierInner {
    visited: HashSet<String>,
    pending: VecDeque<String>,
    /// Keys of the URLs in `pending`
    queued: HashSet<String>,
}

/// Visited set plus pending queue, shared by all workers of a run
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for dispatch
    ///
    /// Returns true and marks the URL visited the first time it is called for
    /// that URL; false on every later call. URLs are compared after
    /// normalization, so `https://www.a.com/x/` and `https://a.com/x` are the
    /// same claim.
    pub fn try_claim(&self, url: &str) -> bool {
        let key = frontier_key(url);
        self.with_inner(|inner| inner.visited.insert(key))
    }

    /// Queues a discovered URL unless it was already claimed or queued
    ///
    /// Returns true if the URL was queued. Queuing does not claim; the URL is
    /// claimed when it is popped for dispatch.
    pub fn push_pending(&self, url: String) -> bool {
        let key = frontier_key(&url);
        self.with_inner(|inner| {
            if inner.visited.contains(&key) || !inner.queued.insert(key) {
                false
            } else {
                inner.pending.push_back(url);
                true
            }
        })
    }

    /// Takes the next pending URL that has not been claimed since it was queued
    pub fn pop_pending(&self) -> Option<String> {
        self.with_inner(|inner| {
            while let Some(url) = inner.pending.pop_front() {
                let key = frontier_key(&url);
                inner.queued.remove(&key);
                if !inner.visited.contains(&key) {
                    return Some(url);
                }
            }
            None
        })
    }

    pub fn pending_len(&self) -> usize {
        self.with_inner(|inner| inner.pending.len())
    }

    /// Drops every queued URL; used when a job ends
    pub fn clear_pending(&self) {
        self.with_inner(|inner| {
            inner.pending.clear();
            inner.queued.clear();
        });
    }

    /// Number of URLs claimed so far in the run
    pub fn visited_len(&self) -> usize {
        self.with_inner(|inner| inner.visited.len())
    }

    /// Runs `f` under the lock; a poisoned lock still guards a valid set
    fn with_inner<T>(&self, f: impl FnOnce(&mut FrontierInner) -> T) -> T {
        match self.inner.lock() {
            Ok(mut inner) => f(&mut inner),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
