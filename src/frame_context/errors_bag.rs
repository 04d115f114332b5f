//! Append-only, thread-safe error aggregation (§3.2, §7).

use parking_lot::RwLock;

/// One reported error. `source_type_id` identifies the reporting module
/// (a stable, comparable value — see §9's note on module identity);
/// `source_key` optionally narrows it to a specific instance (e.g. a view
/// id) so errors from one instance can be cleared without disturbing
/// others.
#[derive(Debug, Clone)]
pub struct FrameErrorEntry {
    pub source_type_id: std::any::TypeId,
    pub message: String,
    pub source_key: Option<u64>,
}

/// Thread-safe error bag: writers take an exclusive lock, readers a shared
/// one (§5 "Thread-safety of errors").
#[derive(Default)]
pub struct ErrorBag {
    entries: RwLock<Vec<FrameErrorEntry>>,
}

impl ErrorBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &self,
        source_type_id: std::any::TypeId,
        message: impl Into<String>,
        source_key: Option<u64>,
    ) {
        let message = message.into();
        log::warn!("frame error reported: {message}");
        self.entries.write().push(FrameErrorEntry {
            source_type_id,
            message,
            source_key,
        });
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.entries.read().is_empty()
    }

    /// Returns a snapshot copy of the current errors.
    #[must_use]
    pub fn errors(&self) -> Vec<FrameErrorEntry> {
        self.entries.read().clone()
    }

    /// Clears all errors from `source_type_id`, optionally narrowed to a
    /// single `source_key`. Errors from other sources are untouched.
    pub fn clear_from_source(&self, source_type_id: std::any::TypeId, source_key: Option<u64>) {
        self.entries.write().retain(|e| {
            !(e.source_type_id == source_type_id
                && (source_key.is_none() || e.source_key == source_key))
        });
    }

    pub fn clear_all(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid<T: 'static>() -> std::any::TypeId {
        std::any::TypeId::of::<T>()
    }

    struct ModuleA;
    struct ModuleB;

    #[test]
    fn clear_from_source_leaves_other_sources_untouched() {
        let bag = ErrorBag::new();
        bag.report(tid::<ModuleA>(), "boom", Some(1));
        bag.report(tid::<ModuleB>(), "other", None);

        bag.clear_from_source(tid::<ModuleA>(), None);

        let remaining = bag.errors();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].source_type_id, tid::<ModuleB>());
    }

    #[test]
    fn clear_from_source_narrowed_by_key() {
        let bag = ErrorBag::new();
        bag.report(tid::<ModuleA>(), "view 1", Some(1));
        bag.report(tid::<ModuleA>(), "view 2", Some(2));

        bag.clear_from_source(tid::<ModuleA>(), Some(1));

        let remaining = bag.errors();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].source_key, Some(2));
    }
}
