use std::{
    collections::{HashMap, HashSet},
    sync::RwLock,
};

use tracing::trace;

use super::VisibilityOracle;

/// In-memory element tree with per-element `display:none` flags.
///
/// Useful where no real layout engine exists (daemons, tests): callers
/// describe parent links and toggle hidden elements, the oracle walks ancestors.
#[derive(Debug, Default)]
pub struct LayoutVisibility {
    inner: RwLock<Layout>,
}

#[derive(Debug, Default)]
struct Layout {
    /// child id -> parent id
    parents: HashMap<String, String>,
    /// Elements styled `display:none`.
    hidden: HashSet<String>,
}

impl LayoutVisibility {
    /// Create an empty layout where every element is visible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `child` under `parent`, replacing any previous parent.
    pub fn attach(&self, child: impl Into<String>, parent: impl Into<String>) {
        if let Ok(mut layout) = self.inner.write() {
            layout.parents.insert(child.into(), parent.into());
        }
    }

    /// Detach `child` from its parent.
    pub fn detach(&self, child: &str) {
        if let Ok(mut layout) = self.inner.write() {
            layout.parents.remove(child);
        }
    }

    /// Mark an element as hidden (`display:none`) or displayed again.
    pub fn set_hidden(&self, id: impl Into<String>, hidden: bool) {
        let Ok(mut layout) = self.inner.write() else {
            return;
        };
        let id = id.into();
        if hidden {
            layout.hidden.insert(id);
        } else {
            layout.hidden.remove(&id);
        }
    }
}

impl VisibilityOracle for LayoutVisibility {
    fn is_hidden(&self, element_id: &str) -> bool {
        let Ok(layout) = self.inner.read() else {
            return false;
        };

        // Bounded walk: a malformed (cyclic) parent map must not hang the tick.
        let mut current = element_id;
        for _ in 0..=layout.parents.len() {
            if layout.hidden.contains(current) {
                trace!(element = element_id, hidden_by = current, "element is hidden");
                return true;
            }
            match layout.parents.get(current) {
                Some(parent) => current = parent.as_str(),
                None => return false,
            }
        }
        false
    }
}
