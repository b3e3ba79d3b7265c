//! Domain-specific error types for datamantri
//!
//! # Error Categories
//!
//! - **ParseError**: Uploaded file parsing (unsupported types, empty input, malformed content)
//! - **LookupError**: Table lookups against the in-memory data source registry
//! - **MockError**: Operations against the in-memory mock backend
//! - **ConfigError**: Loading and validating the mock backend configuration
//!
//! # Examples
//!
//! ```rust
//! use datamantri::errors::{MockError, ParseError, ResourceKind};
//!
//! let err = ParseError::UnsupportedFileType("pdf".to_string());
//! assert!(err.is_client_error());
//!
//! let err = MockError::not_found(ResourceKind::Dashboard, "7");
//! assert_eq!(err.to_string(), "Dashboard 7 not found");
//! assert!(err.is_not_found());
//! ```

pub mod config;
pub mod lookup;
pub mod mock;
pub mod parse;

pub use config::ConfigError;
pub use lookup::LookupError;
pub use mock::{MockError, ResourceKind};
pub use parse::ParseError;

/// Result type alias for file parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for registry lookups
pub type LookupResult<T> = Result<T, LookupError>;

/// Result type alias for mock backend operations
pub type MockResult<T> = Result<T, MockError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
