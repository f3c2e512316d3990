//! # sqlhelper
//!
//! Two small pieces of a database-access layer:
//!
//! - **Statement pooling**: [`StatementPool`] lends out reusable statement handles on a single
//!   connection so that nested query execution neither leaks nor collides, with a hard ceiling
//!   on nesting depth.
//! - **SQL text builders**: the [`sql`] module turns values and condition/data maps into
//!   complete statements with escaped literals, and rejects text that carries semicolons,
//!   comments or unterminated literals outside of quoted spans.
//!
//! The two are independent. A caller builds SQL text, then executes it through a pooled
//! handle:
//!
//! ```ignore
//! use sqlhelper::{StatementPool, columns, sql};
//!
//! let mut pool = StatementPool::new(conn);
//! let q = sql::select("orders", columns! { "status" => "open", "shipped_at" => sql::not_nil() })?;
//! pool.with_handle(|pool, id| pool.handle_mut(id)?.execute(&q))?;
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): pool lifecycle and rejected-SQL events via `tracing`
//! - `rust_decimal`: `rust_decimal::Decimal` values

pub mod error;
pub mod pool;
pub mod sql;

pub use error::{SqlError, SqlResult};
pub use pool::{
    HandleId, MAX_STATEMENT_NESTING_LEVEL, PoolConfig, StatementHandle, StatementPool,
    StatementSource,
};
pub use sql::{Columns, Conditions, Expr, IntoConditions, NOT_NIL, NotNil, SqlRange, Value};
