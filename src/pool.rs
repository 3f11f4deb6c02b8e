//! Reusable per-stream state.
//!
//! A [`Session`] bundles the allocations a codec churns through per stream,
//! the symbol table and the chunk-assembly scratch buffer, so callers
//! decoding many streams can recycle them instead of reallocating. The pool
//! is an explicit, caller-owned free list; nothing is shared or implicit,
//! and an unreleased session is simply dropped.

use crate::symbols::SymbolTable;

/// Per-stream codec state, recyclable between streams.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) symbols: SymbolTable,
    pub(crate) scratch: Vec<u8>,
}

impl Session {
    /// Creates a fresh session.
    pub fn new() -> Session { Session::default() }

    /// Clears all per-stream state, keeping the allocations.
    pub fn reset(&mut self) {
        self.symbols.reset();
        // scrub, not just truncate: no stale text across streams
        for b in self.scratch.iter_mut() {
            *b = 0;
        }
        self.scratch.clear();
    }

    /// The symbol table held by this session.
    pub fn symbols(&self) -> &SymbolTable { &self.symbols }
}

/// An explicit free list of [`Session`]s.
///
/// # Example
///
/// ```
/// use tokson::pool::CodecPool;
///
/// let mut pool = CodecPool::new();
/// let session = pool.acquire();
/// // ... decode or encode with the session ...
/// pool.release(session);
/// assert_eq!(pool.idle(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CodecPool {
    free: Vec<Session>,
}

impl CodecPool {
    /// Creates an empty pool.
    pub fn new() -> CodecPool { CodecPool::default() }

    /// Takes a session from the pool, or makes a fresh one.
    pub fn acquire(&mut self) -> Session {
        self.free.pop().unwrap_or_default()
    }

    /// Returns a session to the pool, resetting it first.
    pub fn release(&mut self, mut session: Session) {
        session.reset();
        self.free.push(session);
    }

    /// Runs `f` with a pooled session and puts the session back.
    pub fn scoped<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(Session) -> (Session, R),
    {
        let (session, out) = f(self.acquire());
        self.release(session);
        out
    }

    /// The number of idle sessions held.
    pub fn idle(&self) -> usize { self.free.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_resets() {
        let mut pool = CodecPool::new();
        let mut s = pool.acquire();
        s.symbols.define("name".to_string());
        s.scratch.extend_from_slice(b"leftover");
        pool.release(s);

        let s = pool.acquire();
        assert!(s.symbols.is_empty());
        assert!(s.scratch.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn scoped_returns_the_session() {
        let mut pool = CodecPool::new();
        let answer = pool.scoped(|s| (s, 17));
        assert_eq!(answer, 17);
        assert_eq!(pool.idle(), 1);
    }
}
