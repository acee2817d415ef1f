// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertion helpers for results, errors and notification streams.
//! Failure messages name the handle or error code involved.

use std::time::Duration;

use ualink_client::{ClientHandle, DataChangeNotification, NotificationStream};
use ualink_core::error::UaError;
use ualink_core::value::{StatusCode, Variant};

// =============================================================================
// Error Assertions
// =============================================================================

/// Assertion extensions for [`UaError`].
pub trait ErrorAssertions {
    /// Assert the error category.
    fn assert_category(&self, expected: &str);

    /// Assert the error code, e.g. `"UA-0101"`.
    fn assert_code(&self, expected: &str);

    /// Assert whether a retry may succeed.
    fn assert_retryable(&self, expected: bool);
}

impl ErrorAssertions for UaError {
    fn assert_category(&self, expected: &str) {
        assert_eq!(
            self.category(),
            expected,
            "Expected {} error, but got {} ({})",
            expected,
            self.category(),
            self
        );
    }

    fn assert_code(&self, expected: &str) {
        assert_eq!(
            self.error_code().to_string(),
            expected,
            "Unexpected error code for: {}",
            self
        );
    }

    fn assert_retryable(&self, expected: bool) {
        assert_eq!(
            self.is_retryable(),
            expected,
            "Expected retryable={} for: {}",
            expected,
            self
        );
    }
}

// =============================================================================
// Notification Assertions
// =============================================================================

/// Assertion extensions for [`DataChangeNotification`].
pub trait NotificationAssertions {
    /// Assert the notification belongs to `handle`.
    fn assert_handle(&self, handle: ClientHandle);

    /// Assert the value.
    fn assert_value(&self, expected: impl Into<Variant>);

    /// Assert the status code.
    fn assert_status(&self, expected: StatusCode);
}

impl NotificationAssertions for DataChangeNotification {
    fn assert_handle(&self, handle: ClientHandle) {
        assert_eq!(
            self.client_handle, handle,
            "Notification routed to {} instead of {}",
            self.client_handle, handle
        );
    }

    fn assert_value(&self, expected: impl Into<Variant>) {
        let expected = expected.into();
        assert_eq!(
            self.value, expected,
            "Expected value {} for {}, but got {}",
            expected, self.client_handle, self.value
        );
    }

    fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "Expected status {} for {}, but got {}",
            expected, self.client_handle, self.status
        );
    }
}

/// Assertion extensions for notification batches.
pub trait NotificationCollectionAssertions {
    /// Assert the batch is in canonical order.
    fn assert_sorted(&self);

    /// Assert no two adjacent notifications are equal.
    fn assert_no_adjacent_duplicates(&self);

    /// Assert the values in order.
    fn assert_values(&self, expected: &[Variant]);
}

impl NotificationCollectionAssertions for [DataChangeNotification] {
    fn assert_sorted(&self) {
        for (i, pair) in self.windows(2).enumerate() {
            assert!(
                pair[0] <= pair[1],
                "Notifications out of order at index {}: {} > {}",
                i,
                pair[0],
                pair[1]
            );
        }
    }

    fn assert_no_adjacent_duplicates(&self) {
        for (i, pair) in self.windows(2).enumerate() {
            assert!(
                pair[0] != pair[1],
                "Duplicate notification at index {}: {}",
                i + 1,
                pair[1]
            );
        }
    }

    fn assert_values(&self, expected: &[Variant]) {
        let actual: Vec<&Variant> = self.iter().map(|n| &n.value).collect();
        let expected: Vec<&Variant> = expected.iter().collect();
        assert_eq!(actual, expected, "Unexpected notification values");
    }
}

impl NotificationCollectionAssertions for Vec<DataChangeNotification> {
    fn assert_sorted(&self) {
        self.as_slice().assert_sorted();
    }

    fn assert_no_adjacent_duplicates(&self) {
        self.as_slice().assert_no_adjacent_duplicates();
    }

    fn assert_values(&self, expected: &[Variant]) {
        self.as_slice().assert_values(expected);
    }
}

// =============================================================================
// Result Assertions
// =============================================================================

/// Assertion helper for Results.
pub trait ResultAssertions<T, E> {
    /// Assert that the result is Ok and return the value.
    fn assert_ok(self) -> T;

    /// Assert that the result is Err and return the error.
    fn assert_err(self) -> E;
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> ResultAssertions<T, E> for Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, but got Err: {:?}", e),
        }
    }

    fn assert_err(self) -> E {
        match self {
            Ok(v) => panic!("Expected Err, but got Ok: {:?}", v),
            Err(e) => e,
        }
    }
}

/// Assertion helper for Options.
pub trait OptionAssertions<T> {
    /// Assert that the option is Some and return the value.
    fn assert_some(self) -> T;
}

impl<T> OptionAssertions<T> for Option<T> {
    fn assert_some(self) -> T {
        match self {
            Some(v) => v,
            None => panic!("Expected Some, but got None"),
        }
    }
}

// =============================================================================
// Async Assertion Helpers
// =============================================================================

/// Waits for the next notification on `stream`, panicking after `timeout`.
pub async fn expect_next(
    stream: &mut NotificationStream,
    timeout: Duration,
) -> DataChangeNotification {
    match tokio::time::timeout(timeout, stream.next()).await {
        Ok(Some(notification)) => notification,
        Ok(None) => panic!("Stream for {} ended unexpectedly", stream.client_handle()),
        Err(_) => panic!(
            "No notification for {} within {:?}",
            stream.client_handle(),
            timeout
        ),
    }
}

/// Asserts that `stream` has ended, panicking if it yields or stalls.
pub async fn expect_end(stream: &mut NotificationStream, timeout: Duration) {
    match tokio::time::timeout(timeout, stream.next()).await {
        Ok(None) => {}
        Ok(Some(notification)) => panic!("Expected end of stream, got {}", notification),
        Err(_) => panic!("Stream for {} did not end within {:?}", stream.client_handle(), timeout),
    }
}
