// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for address resolution and subscription state tracking.
//!
//! Every fallible operation in the workspace returns a [`UaResult`], carrying
//! exactly one error category:
//!
//! ```text
//! UaError
//! ├── Resolution    - Namespace URI/index could not be resolved
//! ├── Unsupported   - Identifier type outside {numeric, string}
//! ├── NotFound      - Unknown client/subscription handle
//! ├── Subscription  - Invalid state transitions, limits, stream ownership
//! └── Configuration - Invalid address text or client settings
//! ```
//!
//! Dropped notifications are deliberately absent from this hierarchy: an
//! unroutable notification is counted, never reported as an error.
//!
//! # Examples
//!
//! ```
//! use ualink_core::error::{ErrorSeverity, ResolutionError, UaError};
//!
//! let error = UaError::resolution(ResolutionError::unknown_namespace_uri(
//!     "urn:unknown",
//!     "nsu=urn:unknown;s=Pump",
//! ));
//!
//! assert_eq!(error.category(), "resolution");
//! assert_eq!(error.severity(), ErrorSeverity::Warning);
//! assert!(!error.is_retryable());
//! ```

use std::fmt;

use thiserror::Error;
use tracing::Level;

// =============================================================================
// UaError - Main Error Type
// =============================================================================

/// The main error type of the workspace.
#[derive(Debug, Error)]
pub enum UaError {
    /// Namespace resolution errors.
    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    /// Unsupported protocol constructs.
    #[error("{0}")]
    Unsupported(#[from] UnsupportedError),

    /// Unknown handles.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Subscription and monitored item state errors.
    #[error("{0}")]
    Subscription(#[from] SubscriptionError),

    /// Configuration and parsing errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl UaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a resolution error.
    #[inline]
    pub fn resolution(error: ResolutionError) -> Self {
        Self::Resolution(error)
    }

    /// Creates an unsupported error.
    #[inline]
    pub fn unsupported(error: UnsupportedError) -> Self {
        Self::Unsupported(error)
    }

    /// Creates a not found error.
    #[inline]
    pub fn not_found(error: NotFoundError) -> Self {
        Self::NotFound(error)
    }

    /// Creates a subscription error.
    #[inline]
    pub fn subscription(error: SubscriptionError) -> Self {
        Self::Subscription(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    // =========================================================================
    // Convenience Factory Methods
    // =========================================================================

    /// Creates an unknown monitored item error.
    pub fn monitored_item_not_found(client_handle: u32) -> Self {
        Self::NotFound(NotFoundError::monitored_item(client_handle))
    }


    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if retrying the same call may succeed.
    ///
    /// None of the categories are retried internally; a caller may retry a
    /// resolution once a fresh namespace table has been received.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Resolution(e) => e.is_retryable(),
            Self::Subscription(e) => e.is_retryable(),
            Self::Unsupported(_) | Self::NotFound(_) | Self::Configuration(_) => false,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Resolution(e) => e.severity(),
            Self::Unsupported(_) => ErrorSeverity::Error,
            Self::NotFound(_) => ErrorSeverity::Warning,
            Self::Subscription(e) => e.severity(),
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "resolution",
            Self::Unsupported(_) => "unsupported",
            Self::NotFound(_) => "not_found",
            Self::Subscription(_) => "subscription",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Resolution(e) => e.error_code(),
            Self::Unsupported(e) => e.error_code(),
            Self::NotFound(e) => e.error_code(),
            Self::Subscription(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Resolution(e) => e.recovery_hints(),
            Self::Unsupported(e) => e.recovery_hints(),
            Self::NotFound(e) => e.recovery_hints(),
            Self::Subscription(e) => e.recovery_hints(),
            Self::Configuration(e) => e.recovery_hints(),
        }
    }

    /// Returns `true` if this is a resolution error.
    #[inline]
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Returns `true` if this is a not found error.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    ///
    /// Recovery hints are attached as a structured field.
    pub fn log(&self, context: &str) {
        let level = self.tracing_level();
        let code = self.error_code();
        let hints = self.recovery_hints().join("; ");

        match level {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                hints = %hints,
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                hints = %hints,
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                hints = %hints,
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ResolutionError
// =============================================================================

/// Failures turning an application address into a wire identifier, or back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The namespace URI is not present in the current namespace table.
    #[error("Could not resolve '{target}', unknown namespace URI '{uri}'")]
    UnknownNamespaceUri {
        /// The (normalized) URI that was looked up.
        uri: String,
        /// Text form of the address being resolved.
        target: String,
    },

    /// The namespace index is not present in the current namespace table.
    #[error("Unknown namespace index {index}")]
    UnknownNamespaceIndex {
        /// The raw namespace index.
        index: u16,
    },

    /// Neither a namespace index nor a namespace URI was given.
    #[error("Could not resolve '{target}' since no namespace index or URI is given")]
    NoNamespace {
        /// Text form of the address being resolved.
        target: String,
    },

    /// The address does not carry a NodeId that can be extracted directly.
    #[error("Cannot extract the NodeId from the address '{address}'")]
    CannotExtractNodeId {
        /// Text form of the address.
        address: String,
    },

    /// The server's namespace array could not be turned into a table.
    #[error("Namespace array unavailable (status {status:#010x}): {reason}")]
    NamespaceArrayUnavailable {
        /// Status code of the namespace array read.
        status: u32,
        /// Why the value could not be used.
        reason: String,
    },
}

impl ResolutionError {
    /// Creates an unknown namespace URI error.
    pub fn unknown_namespace_uri(uri: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnknownNamespaceUri {
            uri: uri.into(),
            target: target.into(),
        }
    }

    /// Creates an unknown namespace index error.
    pub fn unknown_namespace_index(index: u16) -> Self {
        Self::UnknownNamespaceIndex { index }
    }

    /// Creates a missing namespace error.
    pub fn no_namespace(target: impl Into<String>) -> Self {
        Self::NoNamespace {
            target: target.into(),
        }
    }

    /// Creates a cannot extract NodeId error.
    pub fn cannot_extract_node_id(address: impl Into<String>) -> Self {
        Self::CannotExtractNodeId {
            address: address.into(),
        }
    }

    /// Creates a namespace array unavailable error.
    pub fn namespace_array_unavailable(status: u32, reason: impl Into<String>) -> Self {
        Self::NamespaceArrayUnavailable {
            status,
            reason: reason.into(),
        }
    }

    /// Returns `true` if a later attempt may succeed.
    ///
    /// Unknown URIs and indices may appear after the next namespace array
    /// is received; missing namespaces never resolve.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnknownNamespaceUri { .. }
                | Self::UnknownNamespaceIndex { .. }
                | Self::NamespaceArrayUnavailable { .. }
        )
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownNamespaceUri { .. } | Self::UnknownNamespaceIndex { .. } => {
                ErrorSeverity::Warning
            }
            Self::NoNamespace { .. } | Self::CannotExtractNodeId { .. } => ErrorSeverity::Error,
            Self::NamespaceArrayUnavailable { .. } => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownNamespaceUri { .. } => ErrorCode::new(1, 1),
            Self::UnknownNamespaceIndex { .. } => ErrorCode::new(1, 2),
            Self::NoNamespace { .. } => ErrorCode::new(1, 3),
            Self::CannotExtractNodeId { .. } => ErrorCode::new(1, 4),
            Self::NamespaceArrayUnavailable { .. } => ErrorCode::new(1, 5),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownNamespaceUri { .. } => vec![
                "Check the spelling of the namespace URI",
                "Verify the server exposes this namespace in its NamespaceArray",
                "Retry after the namespace array has been refreshed",
            ],
            Self::UnknownNamespaceIndex { .. } => vec![
                "Namespace indices change between sessions",
                "Refresh the namespace array after reconnecting",
            ],
            Self::NoNamespace { .. } => vec![
                "Provide a namespace URI (preferred) or a namespace index",
            ],
            Self::CannotExtractNodeId { .. } => vec![
                "Translate the relative path to a NodeId first",
                "Use an address built from an expanded NodeId",
            ],
            Self::NamespaceArrayUnavailable { .. } => vec![
                "Read the NamespaceArray node (ns=0;i=2255) again",
                "Check the server status",
            ],
        }
    }
}

// =============================================================================
// UnsupportedError
// =============================================================================

/// Protocol constructs this layer does not model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedError {
    /// Node identifier type other than numeric or string.
    #[error("Identifier type '{identifier_type}' is not supported, only Numeric and String are")]
    IdentifierType {
        /// Name of the identifier type that was encountered.
        identifier_type: &'static str,
    },
}

impl UnsupportedError {
    /// Creates an unsupported identifier type error.
    pub fn identifier_type(identifier_type: &'static str) -> Self {
        Self::IdentifierType { identifier_type }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::IdentifierType { .. } => ErrorCode::new(2, 1),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::IdentifierType { .. } => vec![
                "The server uses GUID or opaque node identifiers",
                "Address the node through a browse path instead",
            ],
        }
    }
}

// =============================================================================
// NotFoundError
// =============================================================================

/// A handle referenced by the caller or the transport does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    /// Unknown client monitored item handle.
    #[error("Monitored item not found: client handle {client_handle}")]
    MonitoredItem {
        /// The client handle.
        client_handle: u32,
    },

    /// Unknown client subscription handle.
    #[error("Subscription not found: client handle {subscription_handle}")]
    Subscription {
        /// The client subscription handle.
        subscription_handle: u32,
    },
}

impl NotFoundError {
    /// Creates an unknown monitored item error.
    pub fn monitored_item(client_handle: u32) -> Self {
        Self::MonitoredItem { client_handle }
    }

    /// Creates an unknown subscription error.
    pub fn subscription(subscription_handle: u32) -> Self {
        Self::Subscription {
            subscription_handle,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MonitoredItem { .. } => ErrorCode::new(3, 1),
            Self::Subscription { .. } => ErrorCode::new(3, 2),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        vec![
            "The handle may already have been removed",
            "Client and transport bookkeeping are out of sync",
        ]
    }
}

// =============================================================================
// SubscriptionError
// =============================================================================

/// Subscription and monitored item state errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// State transition not allowed by the subscription lifecycle.
    #[error("Invalid transition for subscription {subscription_handle}: {from} -> {to}")]
    InvalidTransition {
        /// Client subscription handle.
        subscription_handle: u32,
        /// Current state.
        from: &'static str,
        /// Requested state.
        to: &'static str,
    },

    /// The subscription has been deleted.
    #[error("Subscription {subscription_handle} has been deleted")]
    Deleted {
        /// Client subscription handle.
        subscription_handle: u32,
    },

    /// Too many monitored items.
    #[error("Too many monitored items: {count} (max: {max})")]
    TooManyMonitoredItems {
        /// Current count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Too many subscriptions.
    #[error("Too many subscriptions: {count} (max: {max})")]
    TooManySubscriptions {
        /// Current count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// The notification stream for this handle was already taken.
    #[error("Notification stream for client handle {client_handle} was already taken")]
    StreamTaken {
        /// Client monitored item handle.
        client_handle: u32,
    },

    /// Every handle of the 32-bit range has been issued.
    #[error("No {kind} handles left on this connection")]
    HandlesExhausted {
        /// Which handle space ran out.
        kind: &'static str,
    },
}

impl SubscriptionError {
    /// Creates an invalid transition error.
    pub fn invalid_transition(subscription_handle: u32, from: &'static str, to: &'static str) -> Self {
        Self::InvalidTransition {
            subscription_handle,
            from,
            to,
        }
    }

    /// Creates a deleted subscription error.
    pub fn deleted(subscription_handle: u32) -> Self {
        Self::Deleted {
            subscription_handle,
        }
    }

    /// Creates a too many monitored items error.
    pub fn too_many_monitored_items(count: usize, max: usize) -> Self {
        Self::TooManyMonitoredItems { count, max }
    }

    /// Creates a too many subscriptions error.
    pub fn too_many_subscriptions(count: usize, max: usize) -> Self {
        Self::TooManySubscriptions { count, max }
    }

    /// Creates a stream taken error.
    pub fn stream_taken(client_handle: u32) -> Self {
        Self::StreamTaken { client_handle }
    }

    /// Creates a handles exhausted error.
    pub fn handles_exhausted(kind: &'static str) -> Self {
        Self::HandlesExhausted { kind }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TooManyMonitoredItems { .. } | Self::TooManySubscriptions { .. }
        )
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTransition { .. } => ErrorSeverity::Warning,
            Self::Deleted { .. } => ErrorSeverity::Warning,
            Self::TooManyMonitoredItems { .. } | Self::TooManySubscriptions { .. } => {
                ErrorSeverity::Error
            }
            Self::StreamTaken { .. } => ErrorSeverity::Error,
            Self::HandlesExhausted { .. } => ErrorSeverity::Critical,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidTransition { .. } => ErrorCode::new(4, 1),
            Self::Deleted { .. } => ErrorCode::new(4, 2),
            Self::TooManyMonitoredItems { .. } => ErrorCode::new(4, 3),
            Self::TooManySubscriptions { .. } => ErrorCode::new(4, 4),
            Self::StreamTaken { .. } => ErrorCode::new(4, 5),
            Self::HandlesExhausted { .. } => ErrorCode::new(4, 6),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidTransition { .. } => vec![
                "Subscriptions must be confirmed by the server before suspension",
                "Deleted subscriptions cannot be reactivated, create a new one",
            ],
            Self::Deleted { .. } => vec!["Create a new subscription"],
            Self::TooManyMonitoredItems { .. } => vec![
                "Remove unused monitored items",
                "Increase max_monitored_items in the client configuration",
            ],
            Self::TooManySubscriptions { .. } => vec![
                "Delete unused subscriptions",
                "Increase max_subscriptions in the client configuration",
            ],
            Self::StreamTaken { .. } => vec![
                "Notification streams cannot be restarted",
                "Keep the first stream or create a new monitored item",
            ],
            Self::HandlesExhausted { .. } => vec![
                "Reconnect to start a fresh handle range",
                "Lower first_client_handle in the client configuration",
            ],
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Invalid address text or client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Invalid node ID format.
    #[error("Invalid node ID format: '{input}' - {reason}")]
    InvalidNodeId {
        /// The invalid text.
        input: String,
        /// Reason.
        reason: String,
    },

    /// Invalid qualified name format.
    #[error("Invalid qualified name format: '{input}' - {reason}")]
    InvalidQualifiedName {
        /// The invalid text.
        input: String,
        /// Reason.
        reason: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Configuration field.
        field: String,
        /// Reason.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid node ID error.
    pub fn invalid_node_id(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid qualified name error.
    pub fn invalid_qualified_name(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQualifiedName {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidNodeId { .. } => ErrorCode::new(5, 1),
            Self::InvalidQualifiedName { .. } => ErrorCode::new(5, 2),
            Self::InvalidValue { .. } => ErrorCode::new(5, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidNodeId { .. } => vec![
                "Use format: ns=<index>;i=<number> or nsu=<uri>;s=<string>",
                "Example: ns=2;s=MyDevice.Temperature",
            ],
            Self::InvalidQualifiedName { .. } => vec![
                "Use format: <index>:<name> or <name>",
                "Example: 2:Temperature",
            ],
            Self::InvalidValue { .. } => vec!["Check the client configuration values"],
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error => Level::ERROR,
            Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
///
/// Format: `UA-XXYY` where XX is category and YY is specific error.
///
/// Categories:
/// - 1: Resolution
/// - 2: Unsupported
/// - 3: NotFound
/// - 4: Subscription
/// - 5: Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1-5).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the full error code as a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | (self.code as u16)
    }

    /// Creates from a u16.
    pub fn from_u16(value: u16) -> Self {
        Self {
            category: (value >> 8) as u8,
            code: (value & 0xFF) as u8,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with UaError.
pub type UaResult<T> = Result<T, UaError>;

// =============================================================================
// Tests
// =============================================================================
