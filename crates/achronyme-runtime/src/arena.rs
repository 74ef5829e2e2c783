//! The process-wide value registry.
//!
//! Handles are dense slot indices; freed slots are recycled LIFO. The
//! arena never shrinks its slot table, so a handle stays invalid (not
//! dangling) between release and reuse.

use achronyme_common::{EngineError, EngineErrorKind};
use achronyme_eval::Value;
use rustc_hash::FxHashMap;

/// Opaque value identifier handed across the ABI. Zero is a valid
/// handle (the first allocation).
pub type Handle = u32;

/// Lifetime counters. `active_handles` is derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub total_alloc: u64,
    pub total_free: u64,
    pub fast_path_ops: u64,
    pub slow_path_ops: u64,
}

impl ArenaStats {
    pub fn active_handles(&self) -> u64 {
        self.total_alloc - self.total_free
    }
}

pub struct HandleArena {
    slots: Vec<Option<Value>>,
    free: Vec<Handle>,
    bindings: FxHashMap<String, Handle>,
    stats: ArenaStats,
}

impl Default for HandleArena {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleArena {
    pub fn new() -> Self {
        HandleArena {
            slots: Vec::new(),
            free: Vec::new(),
            bindings: FxHashMap::default(),
            stats: ArenaStats::default(),
        }
    }

    /// Store a value, reusing the most recently freed slot when one is
    /// available. O(1) amortized.
    pub fn alloc(&mut self, value: Value) -> Handle {
        self.stats.total_alloc += 1;
        if let Some(h) = self.free.pop() {
            self.slots[h as usize] = Some(value);
            h
        } else {
            let h = self.slots.len() as Handle;
            self.slots.push(Some(value));
            h
        }
    }

    pub fn get(&self, h: Handle) -> Result<&Value, EngineError> {
        self.slots
            .get(h as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| {
                EngineError::new(EngineErrorKind::InvalidHandle)
                    .with_message(format!("handle {h} is not allocated"))
            })
    }

    pub fn is_live(&self, h: Handle) -> bool {
        matches!(self.slots.get(h as usize), Some(Some(_)))
    }

    /// Free a slot. Idempotent: releasing a freed or never-allocated
    /// handle is a no-op. Returns the names whose bindings pointed at
    /// the slot, so the caller can clear the matching environment
    /// entries.
    pub fn release(&mut self, h: Handle) -> Vec<String> {
        match self.slots.get_mut(h as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                self.free.push(h);
                self.stats.total_free += 1;
                let names: Vec<String> = self
                    .bindings
                    .iter()
                    .filter(|&(_, &bound)| bound == h)
                    .map(|(name, _)| name.clone())
                    .collect();
                for name in &names {
                    self.bindings.remove(name);
                }
                names
            }
            _ => Vec::new(),
        }
    }

    /// Install `name → handle`; re-binding a name replaces its previous
    /// mapping. The handle must be live.
    pub fn bind_name(&mut self, name: &str, h: Handle) -> Result<(), EngineError> {
        if !self.is_live(h) {
            return Err(EngineError::new(EngineErrorKind::InvalidHandle)
                .with_message(format!("cannot bind '{name}' to dead handle {h}")));
        }
        self.bindings.insert(name.to_string(), h);
        Ok(())
    }

    pub fn binding(&self, name: &str) -> Option<Handle> {
        self.bindings.get(name).copied()
    }

    /// Drop every slot, binding and counter.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.bindings.clear();
        self.stats = ArenaStats::default();
    }

    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    pub fn note_fast_op(&mut self) {
        self.stats.fast_path_ops += 1;
    }

    pub fn note_slow_op(&mut self) {
        self.stats.slow_path_ops += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_reuses_freed_slots_lifo() {
        let mut arena = HandleArena::new();
        let a = arena.alloc(Value::Number(1.0));
        let b = arena.alloc(Value::Number(2.0));
        let c = arena.alloc(Value::Number(3.0));
        assert_eq!((a, b, c), (0, 1, 2));

        arena.release(b);
        arena.release(a);
        // Last freed comes back first.
        assert_eq!(arena.alloc(Value::Number(4.0)), a);
        assert_eq!(arena.alloc(Value::Number(5.0)), b);
        assert_eq!(arena.alloc(Value::Number(6.0)), 3);
    }

    #[test]
    fn accounting_tracks_alloc_and_free() {
        let mut arena = HandleArena::new();
        let handles: Vec<Handle> = (0..10)
            .map(|k| arena.alloc(Value::Number(k as f64)))
            .collect();
        for &h in &handles[..4] {
            arena.release(h);
        }
        assert_eq!(arena.stats().total_alloc, 10);
        assert_eq!(arena.stats().total_free, 4);
        assert_eq!(arena.stats().active_handles(), 6);
    }

    #[test]
    fn release_is_idempotent() {
        let mut arena = HandleArena::new();
        let h = arena.alloc(Value::Number(1.0));
        arena.release(h);
        arena.release(h);
        arena.release(999);
        assert_eq!(arena.stats().total_free, 1);
        assert!(arena.get(h).is_err());
    }

    #[test]
    fn get_rejects_dead_and_unallocated() {
        let mut arena = HandleArena::new();
        assert_eq!(
            arena.get(0).unwrap_err().kind,
            EngineErrorKind::InvalidHandle
        );
        let h = arena.alloc(Value::Number(1.0));
        assert!(arena.get(h).is_ok());
        arena.release(h);
        assert_eq!(
            arena.get(h).unwrap_err().kind,
            EngineErrorKind::InvalidHandle
        );
    }

    #[test]
    fn release_clears_bindings() {
        let mut arena = HandleArena::new();
        let h = arena.alloc(Value::Number(1.0));
        arena.bind_name("x", h).unwrap();
        assert_eq!(arena.binding("x"), Some(h));
        let cleared = arena.release(h);
        assert_eq!(cleared, vec!["x".to_string()]);
        assert_eq!(arena.binding("x"), None);
    }

    #[test]
    fn rebinding_replaces() {
        let mut arena = HandleArena::new();
        let a = arena.alloc(Value::Number(1.0));
        let b = arena.alloc(Value::Number(2.0));
        arena.bind_name("x", a).unwrap();
        arena.bind_name("x", b).unwrap();
        assert_eq!(arena.binding("x"), Some(b));
        assert!(arena.bind_name("y", 77).is_err());
    }

    #[test]
    fn reset_clears_everything() {
        let mut arena = HandleArena::new();
        let h = arena.alloc(Value::Number(1.0));
        arena.bind_name("x", h).unwrap();
        arena.note_fast_op();
        arena.note_slow_op();
        arena.reset();
        assert_eq!(*arena.stats(), ArenaStats::default());
        assert_eq!(arena.stats().active_handles(), 0);
        assert!(arena.get(h).is_err());
        assert_eq!(arena.binding("x"), None);
        // Slots start fresh after a reset.
        assert_eq!(arena.alloc(Value::Number(9.0)), 0);
    }
}
