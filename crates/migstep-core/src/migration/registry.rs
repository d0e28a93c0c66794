//! Instance registry.
//!
//! Hands out deterministic per-id indexes for builder instances. One registry
//! tracks content types for a whole run; every content-type instance owns a
//! separate registry for its fields.

use std::collections::HashMap;

/// Format a content type instance id.
pub fn content_type_instance_id(content_type_id: &str, index: usize) -> String {
    format!("contentType/{}/{}", content_type_id, index)
}

/// Format a field instance id.
pub fn field_instance_id(field_id: &str, index: usize) -> String {
    format!("fields/{}/{}", field_id, index)
}

/// Per-scope index allocator.
///
/// Indexes for an id start at 0 and grow by one for every allocation. The
/// most recent allocation is the instance that edits resolve to.
#[derive(Debug, Default, Clone)]
pub struct InstanceRegistry {
    next: HashMap<String, usize>,
}

impl InstanceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh index for `id`.
    pub fn allocate(&mut self, id: &str) -> usize {
        let next = self.next.entry(id.to_string()).or_insert(0);
        let index = *next;
        *next += 1;
        index
    }

    /// Get the most recently allocated index for `id`.
    pub fn current(&self, id: &str) -> Option<usize> {
        self.next.get(id).map(|next| next - 1)
    }

    /// Get the current index for `id`, allocating index 0 on first reference.
    pub fn resolve(&mut self, id: &str) -> usize {
        match self.current(id) {
            Some(index) => index,
            None => self.allocate(id),
        }
    }

    /// Number of indexes allocated for `id`.
    pub fn allocated(&self, id: &str) -> usize {
        self.next.get(id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_increments_per_id() {
        let mut registry = InstanceRegistry::new();
        assert_eq!(registry.allocate("person"), 0);
        assert_eq!(registry.allocate("person"), 1);
        assert_eq!(registry.allocate("address"), 0);
        assert_eq!(registry.allocate("person"), 2);
        assert_eq!(registry.allocated("person"), 3);
        assert_eq!(registry.allocated("missing"), 0);
    }

    #[test]
    fn test_resolve_reuses_latest() {
        let mut registry = InstanceRegistry::new();
        assert_eq!(registry.current("person"), None);
        assert_eq!(registry.resolve("person"), 0);
        assert_eq!(registry.resolve("person"), 0);
        assert_eq!(registry.allocate("person"), 1);
        assert_eq!(registry.resolve("person"), 1);
        assert_eq!(registry.current("person"), Some(1));
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut first = InstanceRegistry::new();
        let mut second = InstanceRegistry::new();
        assert_eq!(first.allocate("fullName"), 0);
        assert_eq!(first.allocate("fullName"), 1);
        assert_eq!(second.allocate("fullName"), 0);
    }

    #[test]
    fn test_instance_id_format() {
        assert_eq!(content_type_instance_id("person", 0), "contentType/person/0");
        assert_eq!(field_instance_id("houseNumber", 2), "fields/houseNumber/2");
    }
}
