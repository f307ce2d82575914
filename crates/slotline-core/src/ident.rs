//! Element id allocation for slot containers created without an id.
use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use slotline_model::DEFAULT_ELEMENT_TAG;

/// Allocator of unique container element ids.
///
/// Ids have the form `{tag}-{seq:x}` where `seq` is a per-allocator
/// monotonically increasing sequence. Every generated id is remembered so
/// it is never handed out twice.
#[derive(Debug)]
pub struct ElementIds {
    seq: AtomicU64,
    generated: Mutex<HashSet<String>>,
}

impl ElementIds {
    /// Create an allocator with an empty history.
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(1),
            generated: Mutex::new(HashSet::new()),
        }
    }

    /// Generate a fresh id with the given tag (lowercased, `gpt-ad` when empty).
    pub fn generate(&self, tag: &str) -> String {
        let tag = match tag.trim() {
            "" => DEFAULT_ELEMENT_TAG.to_string(),
            t => t.to_ascii_lowercase(),
        };
        let mut generated = self
            .generated
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        loop {
            let id = format!("{tag}-{seq:x}", seq = self.seq.fetch_add(1, Ordering::Relaxed));
            if generated.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Return the id a container should use.
    ///
    /// An existing non-empty id is kept unless it collides with a generated one;
    /// otherwise a new id is generated from `tag`.
    pub fn resolve(&self, existing: Option<&str>, tag: &str) -> String {
        match existing.map(str::trim) {
            Some(id) if !id.is_empty() && self.is_unique(id) => id.to_string(),
            _ => self.generate(tag),
        }
    }

    /// Returns `true` if `id` was generated by this allocator.
    pub fn is_taken(&self, id: &str) -> bool {
        self.generated
            .lock()
            .map(|g| g.contains(id))
            .unwrap_or_else(|poisoned| poisoned.into_inner().contains(id))
    }

    /// Returns `true` if `id` was not generated by this allocator.
    pub fn is_unique(&self, id: &str) -> bool {
        !self.is_taken(id)
    }
}

impl Default for ElementIds {
    fn default() -> Self {
        Self::new()
    }
}
