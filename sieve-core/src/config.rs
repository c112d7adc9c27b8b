//! Compiler configuration
//!
//! Loaded from environment variables with defaults suited to a browser-side
//! filter builder.

use crate::date::offset_from_minutes;
use crate::{CoreError, CoreResult, OffsetDateTimeConverter};
use serde::{Deserialize, Serialize};

/// Settings shared by the expression generator, flattening and paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Drop every null or empty-string leaf, whatever its operator
    pub legacy_value_guards: bool,

    /// Page size used by paged streams when a query has no `top`
    pub default_page_size: u32,

    /// Deepest chain of nested view-model lists expanded when flattening
    pub max_flatten_depth: usize,

    /// Offset of `DateDisplayMode::UserLocal`, in minutes east of UTC
    pub user_utc_offset_minutes: Option<i32>,

    /// Offset of `DateDisplayMode::ServerLocal`, in minutes east of UTC
    pub server_utc_offset_minutes: Option<i32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            legacy_value_guards: false,
            default_page_size: 250,
            max_flatten_depth: 8,
            user_utc_offset_minutes: None,
            server_utc_offset_minutes: None,
        }
    }
}

impl GeneratorConfig {
    /// Create GeneratorConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SIEVE_LEGACY_VALUE_GUARDS`: "true" or "false" (default: false)
    /// - `SIEVE_DEFAULT_PAGE_SIZE`: Page size for paged streams (default: 250)
    /// - `SIEVE_MAX_FLATTEN_DEPTH`: Nested list expansion limit (default: 8)
    /// - `SIEVE_USER_UTC_OFFSET_MINUTES`: User zone offset (default: unset)
    /// - `SIEVE_SERVER_UTC_OFFSET_MINUTES`: Server zone offset (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let legacy_value_guards = std::env::var("SIEVE_LEGACY_VALUE_GUARDS")
            .ok()
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.legacy_value_guards);

        let default_page_size = std::env::var("SIEVE_DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.default_page_size);

        let max_flatten_depth = std::env::var("SIEVE_MAX_FLATTEN_DEPTH")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_flatten_depth);

        let user_utc_offset_minutes = std::env::var("SIEVE_USER_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        let server_utc_offset_minutes = std::env::var("SIEVE_SERVER_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            legacy_value_guards,
            default_page_size,
            max_flatten_depth,
            user_utc_offset_minutes,
            server_utc_offset_minutes,
        }
    }

    /// Reject settings the generator cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.default_page_size == 0 {
            return Err(CoreError::Config {
                field: "default_page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_flatten_depth == 0 {
            return Err(CoreError::Config {
                field: "max_flatten_depth".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(minutes) = self.user_utc_offset_minutes {
            offset_from_minutes("user_utc_offset_minutes", minutes)?;
        }
        if let Some(minutes) = self.server_utc_offset_minutes {
            offset_from_minutes("server_utc_offset_minutes", minutes)?;
        }
        Ok(())
    }

    /// Date converter for the configured offsets.
    pub fn date_time_converter(&self) -> CoreResult<OffsetDateTimeConverter> {
        OffsetDateTimeConverter::from_minutes(
            self.user_utc_offset_minutes,
            self.server_utc_offset_minutes,
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
