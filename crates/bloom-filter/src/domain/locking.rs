//! Lock strategy injected into a filter at construction
//!
//! `Unsynchronized` hands out no-op guards; the caller serializes access.
//! `ReadWrite` guards every operation with a reader/writer lock so the `k`
//! bit writes of one insertion are never observed half-done.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How a filter synchronizes its own operations
#[derive(Debug, Default)]
pub enum LockStrategy {
    /// No internal locking
    #[default]
    Unsynchronized,
    /// Shared lock for reads, exclusive lock for writes
    ReadWrite(RwLock<()>),
}

/// Held for the duration of one filter operation
#[must_use = "the lock is released as soon as the guard is dropped"]
pub enum LockGuard<'a> {
    Noop,
    Read(RwLockReadGuard<'a, ()>),
    Write(RwLockWriteGuard<'a, ()>),
}

impl LockStrategy {
    /// Strategy for the given thread-safety choice
    pub fn new(thread_safe: bool) -> Self {
        if thread_safe {
            Self::ReadWrite(RwLock::new(()))
        } else {
            Self::Unsynchronized
        }
    }

    pub fn is_thread_safe(&self) -> bool {
        matches!(self, Self::ReadWrite(_))
    }

    /// Shared access
    pub fn read(&self) -> LockGuard<'_> {
        match self {
            Self::Unsynchronized => LockGuard::Noop,
            Self::ReadWrite(lock) => LockGuard::Read(lock.read()),
        }
    }

    /// Exclusive access
    pub fn write(&self) -> LockGuard<'_> {
        match self {
            Self::Unsynchronized => LockGuard::Noop,
            Self::ReadWrite(lock) => LockGuard::Write(lock.write()),
        }
    }
}
