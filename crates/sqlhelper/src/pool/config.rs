use serde::Deserialize;

/// Default ceiling on statement handles per connection.
///
/// Each level of query nesting holds one handle, so this is also the maximum nesting depth.
pub const MAX_STATEMENT_NESTING_LEVEL: usize = 20;

/// Configuration for `StatementPool`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of handles the pool will ever create.
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_STATEMENT_NESTING_LEVEL,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handle ceiling.
    ///
    /// A ceiling of zero makes every `take` fail; it is accepted so that callers can forbid
    /// statement execution on a connection outright.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}
