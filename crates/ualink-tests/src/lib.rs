// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualink Integration Tests
//!
//! Integration tests for the ualink workspace together with the fixtures,
//! builders and assertions they share.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Namespace arrays, addresses and notification batches
//!   - `builders`: Builders for connections with confirmed monitored items
//!   - `assertions`: Assertion helpers for results and notification streams
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p ualink-tests
//!
//! # Run specific test suite
//! cargo test -p ualink-tests --test integration_resolution
//! cargo test -p ualink-tests --test integration_subscription
//! cargo test -p ualink-tests --test integration_routing
//!
//! # Show logs
//! RUST_LOG=ualink=trace cargo test -p ualink-tests -- --nocapture
//! ```
//!
//! ## Test Categories
//!
//! ### Resolution Tests (`integration_resolution.rs`)
//! - Namespace table construction and lookup
//! - URI/index precedence, unknown namespaces
//! - Wire decoding and reconnect behaviour
//!
//! ### Subscription Tests (`integration_subscription.rs`)
//! - Subscription lifecycle
//! - Monitored item registration and confirmation
//! - Concurrent handle allocation
//!
//! ### Routing Tests (`integration_routing.rs`)
//! - End-to-end notification delivery
//! - Ordering, duplicates and dropped notifications
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use ualink_tests::common::builders::ConnectionBuilder;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let fixture = ConnectionBuilder::new()
//!         .namespaces(["http://opcfoundation.org/UA/", "urn:plant"])
//!         .confirmed_item(100)
//!         .build();
//!     // ... test logic
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::init_test_logging;
}
