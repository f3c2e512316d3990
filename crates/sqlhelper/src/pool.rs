//! Statement handle pooling for nested query execution.
//!
//! A caller executing query A may need to run query B (say, to fetch metadata) before A is
//! finished, which needs two live statements on the same connection. [`StatementPool`] lends
//! out handles for that, reuses released ones, and creates new ones lazily up to a ceiling.
//! Hitting the ceiling means the caller is recursing deeper than intended, so it is an error
//! rather than a wait.
//!
//! The pool owns every handle it creates. Callers get a [`HandleId`] and reach the handle
//! through [`StatementPool::handle_mut`]; only the pool ever closes a handle.
//!
//! # Example
//!
//! ```ignore
//! use sqlhelper::{StatementPool, sql};
//!
//! let mut pool = StatementPool::new(conn);
//! pool.with_handle(|pool, outer| {
//!     pool.handle_mut(outer)?.execute(&sql::select("users", None)?)?;
//!     pool.with_handle(|pool, inner| {
//!         pool.handle_mut(inner)?.execute(&sql::count("audit_logs", None)?)
//!     })
//! })?;
//! pool.close()?;
//! ```

mod config;


pub use config::{MAX_STATEMENT_NESTING_LEVEL, PoolConfig};

use crate::error::{SqlError, SqlResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A connection that can create statement handles.
pub trait StatementSource {
    /// The handle type this connection creates.
    type Handle: StatementHandle;
    /// Error returned when a handle cannot be created.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a new statement handle on this connection.
    fn create_statement(&mut self) -> Result<Self::Handle, Self::Error>;
}

/// A statement handle created by a [`StatementSource`].
pub trait StatementHandle {
    /// Error returned when the handle fails to close.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Release the driver resources behind this handle.
    fn close(&mut self) -> Result<(), Self::Error>;
}

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a handle checked out of a specific [`StatementPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    pool: u64,
    slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Occupied,
}

struct Slot<H> {
    handle: H,
    state: SlotState,
}

/// A bounded pool of statement handles bound to one connection.
///
/// Not thread-safe: one logical caller per connection. Nesting is the only supported form of
/// overlapping use.
pub struct StatementPool<C: StatementSource> {
    id: u64,
    conn: Option<C>,
    max_size: usize,
    slots: Vec<Slot<C::Handle>>,
    /// Indices of `Free` slots; the most recently released handle is reused first.
    free: Vec<usize>,
}

impl<C: StatementSource> StatementPool<C> {
    /// Create a pool over `conn` with the default configuration.
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, PoolConfig::default())
    }

    /// Create a pool over `conn` with a custom configuration.
    pub fn with_config(conn: C, config: PoolConfig) -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            conn: Some(conn),
            max_size: config.max_size,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Check out a handle, creating one if none is free.
    ///
    /// Fails with [`SqlError::NestingTooDeep`] when `max_size` handles are already checked out.
    pub fn take(&mut self) -> SqlResult<HandleId> {
        let Some(conn) = self.conn.as_mut() else {
            return Err(SqlError::PoolClosed);
        };

        if let Some(slot) = self.free.pop() {
            self.slots[slot].state = SlotState::Occupied;
            return Ok(HandleId {
                pool: self.id,
                slot,
            });
        }

        if self.slots.len() >= self.max_size {
            return Err(SqlError::NestingTooDeep {
                max_size: self.max_size,
            });
        }

        let handle = conn.create_statement().map_err(SqlError::driver)?;
        let slot = self.slots.len();
        self.slots.push(Slot {
            handle,
            state: SlotState::Occupied,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlhelper.pool",
            pool = self.id,
            handles = self.slots.len(),
            max_size = self.max_size,
            "created statement handle"
        );

        Ok(HandleId {
            pool: self.id,
            slot,
        })
    }

    /// Return a handle to the pool. `None` is accepted and ignored.
    pub fn release(&mut self, handle: impl Into<Option<HandleId>>) -> SqlResult<()> {
        let Some(id) = handle.into() else {
            return Ok(());
        };
        if self.conn.is_none() {
            return Err(SqlError::PoolClosed);
        }

        let slot = self.occupied_slot(id)?;
        self.slots[slot].state = SlotState::Free;
        self.free.push(slot);
        Ok(())
    }

    /// Run `body` with a checked-out handle, releasing it whether `body` succeeds or fails.
    ///
    /// `body` receives the pool itself so that it can nest further `with_handle` calls. If
    /// `body` panics the handle stays checked out until the pool is closed.
    pub fn with_handle<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self, HandleId) -> Result<T, E>,
        E: From<SqlError>,
    {
        let id = self.take()?;
        let result = body(self, id);
        let released = self.release(id);
        let value = result?;
        released?;
        Ok(value)
    }

    /// Borrow a checked-out handle.
    pub fn handle_mut(&mut self, id: HandleId) -> SqlResult<&mut C::Handle> {
        if self.conn.is_none() {
            return Err(SqlError::PoolClosed);
        }
        let slot = self.occupied_slot(id)?;
        Ok(&mut self.slots[slot].handle)
    }

    /// Visit every handle the pool knows about: free handles first, then checked-out ones.
    pub fn for_each(&mut self, mut visit: impl FnMut(&mut C::Handle)) {
        for idx in self.visit_order() {
            visit(&mut self.slots[idx].handle);
        }
    }

    /// Close every handle and detach from the connection.
    ///
    /// Handles that fail to close are logged and counted; the remaining handles are still
    /// closed. The pool is empty and unusable afterwards either way. Closing an already closed
    /// pool does nothing.
    pub fn close(&mut self) -> SqlResult<()> {
        if self.conn.is_none() {
            return Ok(());
        }

        let order = self.visit_order();
        let mut failed = 0usize;
        for idx in order {
            if let Err(_err) = self.slots[idx].handle.close() {
                failed += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "sqlhelper.pool",
                    pool = self.id,
                    error = %_err,
                    "failed to close statement handle"
                );
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlhelper.pool",
            pool = self.id,
            handles = self.slots.len(),
            failed,
            "closed statement pool"
        );

        self.conn = None;
        self.slots.clear();
        self.free.clear();

        if failed > 0 {
            return Err(SqlError::CloseFailed { failed });
        }
        Ok(())
    }

    /// The ceiling on handles this pool will create.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of handles created so far (free and checked out).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no handles.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// The owning connection, or `None` once the pool is closed.
    pub fn connection(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    pub fn connection_mut(&mut self) -> Option<&mut C> {
        self.conn.as_mut()
    }

    fn occupied_slot(&self, id: HandleId) -> SqlResult<usize> {
        if id.pool != self.id {
            return Err(SqlError::NotOwned);
        }
        match self.slots.get(id.slot) {
            Some(slot) if slot.state == SlotState::Occupied => Ok(id.slot),
            _ => Err(SqlError::NotOwned),
        }
    }

    fn visit_order(&self) -> Vec<usize> {
        let occupied = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Occupied)
            .map(|(idx, _)| idx);
        self.free.iter().copied().chain(occupied).collect()
    }
}

impl<C: StatementSource> Drop for StatementPool<C> {
    fn drop(&mut self) {
        // Failures are already logged by `close`.
        let _ = self.close();
    }
}

impl<C: StatementSource> fmt::Debug for StatementPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementPool")
            .field("id", &self.id)
            .field("max_size", &self.max_size)
            .field("free", &self.free_count())
            .field("occupied", &self.occupied_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
