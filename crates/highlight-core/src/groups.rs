//! Color groups and the name-to-id registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// An opaque color group identifier.
///
/// `Group::DEFAULT` (0) means "no special styling". Every other value is handed out by a
/// [`GroupRegistry`] and stays bound to the same name for the registry's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Group(pub u32);

impl Group {
    /// The default group (no special styling).
    pub const DEFAULT: Self = Self(0);

    /// Create a group from a raw numeric identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw numeric value of this group.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns `true` for [`Group::DEFAULT`].
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

const DEFAULT_GROUP_NAME: &str = "default";

#[derive(Debug, Default)]
struct GroupTable {
    name_to_group: HashMap<String, Group>,
    group_to_name: Vec<String>,
}

/// Append-only mapping from group names to stable [`Group`] ids.
///
/// Ids are allocated sequentially starting at 1 and are never reused. The registry is meant to be
/// created once (per process or per grammar set) and shared, typically behind an `Arc`, between
/// the grammar loader and every highlighter that needs to name groups.
///
/// Registering a new name takes the write lock; looking up a known name only takes the read lock.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    table: RwLock<GroupTable>,
}

impl GroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or allocate) the group for `name`.
    pub fn resolve(&self, name: &str) -> Group {
        if let Some(group) = self.lookup(name) {
            return group;
        }

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have registered the name between the two locks.
        if let Some(&group) = table.name_to_group.get(name) {
            return group;
        }

        let group = Group(table.group_to_name.len() as u32 + 1);
        table.group_to_name.push(name.to_string());
        table.name_to_group.insert(name.to_string(), group);
        group
    }

    /// Look up an already registered name without allocating.
    pub fn lookup(&self, name: &str) -> Option<Group> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.name_to_group.get(name).copied()
    }

    /// Return the name a group was registered under.
    pub fn name(&self, group: Group) -> Option<String> {
        if group.is_default() {
            return Some(DEFAULT_GROUP_NAME.to_string());
        }
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let idx = (group.0 - 1) as usize;
        table.group_to_name.get(idx).cloned()
    }

    /// Number of registered (non-default) groups.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .group_to_name
            .len()
    }

    /// Returns `true` if no group has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_resolve_is_stable_and_sequential() {
        let registry = GroupRegistry::new();
        let comment = registry.resolve("comment");
        let string = registry.resolve("constant.string");

        assert_eq!(comment.id(), 1);
        assert_eq!(string.id(), 2);
        assert_eq!(registry.resolve("comment"), comment);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_does_not_allocate() {
        let registry = GroupRegistry::new();
        assert_eq!(registry.lookup("type"), None);
        assert!(registry.is_empty());

        let ty = registry.resolve("type");
        assert_eq!(registry.lookup("type"), Some(ty));
    }

    #[test]
    fn test_name_round_trip() {
        let registry = GroupRegistry::new();
        let todo = registry.resolve("todo");

        assert_eq!(registry.name(todo).as_deref(), Some("todo"));
        assert_eq!(registry.name(Group::DEFAULT).as_deref(), Some("default"));
        assert_eq!(registry.name(Group(42)), None);
    }

    #[test]
    fn test_concurrent_first_use_yields_one_id() {
        let registry = Arc::new(GroupRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.resolve("statement"))
            })
            .collect();

        let ids: Vec<Group> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|&g| g == ids[0]));
        assert_eq!(registry.len(), 1);
    }
}
