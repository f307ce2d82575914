//! Visibility predicate consulted before every periodic refresh.
mod layout;
pub use layout::LayoutVisibility;

/// Answers whether a slot's container is currently hidden by layout.
///
/// An element counts as hidden when it, or any of its ancestors, is not displayed.
/// The predicate is total: when the state cannot be determined it must answer `false`,
/// otherwise refreshes of that slot would be starved forever.
///
/// Queried from timer tasks without the scheduler lock held; it may read scheduler state.
pub trait VisibilityOracle: Send + Sync + 'static {
    fn is_hidden(&self, element_id: &str) -> bool;
}

/// Oracle for environments without layout: every element is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl VisibilityOracle for AlwaysVisible {
    #[inline]
    fn is_hidden(&self, _: &str) -> bool {
        false
    }
}
