//! Runtime configuration for the todo store
//!
//! Values come from environment variables. Every variable is optional; unset
//! variables keep the [`Default`] value.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `TODO_MIDDLEWARE` | `on` / `off` | `off` |
//! | `TODO_REMOVE_BEHAVIOR` | `delete` / `inert` | `delete` |
//! | `TODO_BROADCAST_CAPACITY` | integer in `1..=65536` | `16` |
//! | `TODO_METRICS` | `on` / `off` | `off` |

use crate::reducer::{ParseRemoveBehaviorError, RemoveBehavior};
use thiserror::Error;
use todo_store_runtime::{DEFAULT_BROADCAST_CAPACITY, MAX_BROADCAST_CAPACITY};

/// `EnvFilter` directives used when `RUST_LOG` is unset
///
/// Middleware logs at `debug`, so its target is opened one level further.
pub const DEFAULT_LOG_FILTER: &str =
    "todo=info,todo_store_runtime=info,todo_store_runtime::middleware=debug";

/// Errors while reading [`TodoConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to something that cannot be parsed
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Raw value found
        value: String,
        /// What would have been accepted
        expected: &'static str,
    },

    /// A parsed value is below the minimum
    #[error("{key} must be at least 1")]
    Zero {
        /// Variable name
        key: &'static str,
    },

    /// A parsed value is above the maximum
    #[error("{key} must be at most {max}")]
    TooLarge {
        /// Variable name
        key: &'static str,
        /// Largest accepted value
        max: usize,
    },
}

/// Store configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoConfig {
    /// Attach logging and default middleware
    pub middleware: bool,
    /// How `Remove` actions are handled
    pub remove_behavior: RemoveBehavior,
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// Install the Prometheus recorder
    pub metrics: bool,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            middleware: false,
            remove_behavior: RemoveBehavior::Delete,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            metrics: false,
        }
    }
}

impl TodoConfig {
    /// Read the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("TODO_MIDDLEWARE") {
            config.middleware = parse_switch("TODO_MIDDLEWARE", value)?;
        }

        if let Some(value) = lookup("TODO_REMOVE_BEHAVIOR") {
            config.remove_behavior =
                value
                    .parse::<RemoveBehavior>()
                    .map_err(|ParseRemoveBehaviorError(value)| ConfigError::InvalidValue {
                        key: "TODO_REMOVE_BEHAVIOR",
                        value,
                        expected: "delete or inert",
                    })?;
        }

        if let Some(value) = lookup("TODO_BROADCAST_CAPACITY") {
            config.broadcast_capacity =
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "TODO_BROADCAST_CAPACITY",
                        value,
                        expected: "a positive integer",
                    })?;
        }

        if let Some(value) = lookup("TODO_METRICS") {
            config.metrics = parse_switch("TODO_METRICS", value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but are unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] if the broadcast capacity is 0 and
    /// [`ConfigError::TooLarge`] if it exceeds [`MAX_BROADCAST_CAPACITY`].
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Zero {
                key: "TODO_BROADCAST_CAPACITY",
            });
        }
        if self.broadcast_capacity > MAX_BROADCAST_CAPACITY {
            return Err(ConfigError::TooLarge {
                key: "TODO_BROADCAST_CAPACITY",
                max: MAX_BROADCAST_CAPACITY,
            });
        }
        Ok(())
    }
}

fn parse_switch(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            expected: "on or off",
        }),
    }
}
