//! Resolution stack for circular dependency detection.

use crate::error::{DiError, DiResult};
use crate::key::Key;

const MAX_DEPTH: usize = 1024;

/// Keys currently being resolved by one top-level request.
///
/// Every `get`, `create` and lazy handle starts from an empty stack; the stack
/// is threaded through the recursive resolution and never shared across
/// requests or threads.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    keys: Vec<Key>,
}

impl ResolutionStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with `key` pushed. Fails with the full path if `key` is
    /// already being resolved.
    pub(crate) fn guarded<T, F>(&mut self, key: Key, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        if self.keys.contains(&key) {
            let mut path: Vec<&'static str> = self.keys.iter().map(Key::display_name).collect();
            path.push(key.display_name());
            return Err(DiError::Circular(path));
        }
        if self.keys.len() >= MAX_DEPTH {
            return Err(DiError::DepthExceeded(self.keys.len()));
        }

        self.keys.push(key);
        let result = f(self);
        self.keys.pop();
        result
    }

    /// Like [`guarded`](Self::guarded), but a key equal to the current top is
    /// not pushed twice (a concrete request resolving to its own component).
    pub(crate) fn component<T, F>(&mut self, key: Key, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        if self.keys.last() == Some(&key) {
            f(self)
        } else {
            self.guarded(key, f)
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.keys.len()
    }
}
