//! Name Interning Pool
//!
//! Deduplicated storage for tag and attribute names. Names are interned
//! once and referenced by `u32` ids from the node arena, so comparing two
//! tags is an integer comparison.
//!
//! Id 0 is reserved for "no name".

use std::collections::HashMap;

#[derive(Debug)]
pub struct NamePool {
    /// Names indexed by id
    names: Vec<Box<str>>,
    /// Name -> id lookup
    index: HashMap<Box<str>, u32>,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

impl NamePool {
    /// Create a new pool with the reserved empty entry
    pub fn new() -> Self {
        let mut pool = NamePool {
            names: Vec::with_capacity(64),
            index: HashMap::with_capacity(64),
        };
        pool.names.push("".into());
        pool
    }

    /// Intern a name, returning its id. The empty name is always 0.
    pub fn intern(&mut self, name: &str) -> u32 {
        if name.is_empty() {
            return 0;
        }
        if let Some(&id) = self.index.get(name) {
            return id;
        }

        let id = self.names.len() as u32;
        self.names.push(name.into());
        self.index.insert(name.into(), id);
        id
    }

    /// Look up an already interned name without inserting it
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<u32> {
        if name.is_empty() {
            return Some(0);
        }
        self.index.get(name).copied()
    }

    /// Resolve an id back to its name
    #[inline]
    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(|n| n.as_ref())
    }

    /// Number of interned names, including the reserved entry
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_get() {
        let mut pool = NamePool::new();
        let id = pool.intern("mark");
        assert!(id > 0);
        assert_eq!(pool.get(id), Some("mark"));
    }

    #[test]
    fn test_intern_duplicate() {
        let mut pool = NamePool::new();
        let a = pool.intern("class");
        let b = pool.intern("class");
        assert_eq!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_empty_name() {
        let mut pool = NamePool::new();
        assert_eq!(pool.intern(""), 0);
        assert_eq!(pool.get(0), Some(""));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_lookup_does_not_insert() {
        let pool = NamePool::new();
        assert_eq!(pool.lookup("span"), None);
        assert_eq!(pool.len(), 1);
    }
}
