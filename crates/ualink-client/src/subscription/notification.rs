// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Data change notifications.
//!
//! [`RawNotification`] is what the transport hands over: tagged with the
//! server handle. [`DataChangeNotification`] is what the application
//! receives: tagged with its own client handle.
//!
//! Notifications are totally ordered by client handle, status, source
//! timestamp, server timestamp and value, in that order. Absent timestamps
//! sort first.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ualink_core::value::{StatusCode, Variant};

use super::handle::{ClientHandle, ServerHandle};

// =============================================================================
// RawNotification
// =============================================================================

/// A change notification as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNotification {
    /// Server handle of the monitored item.
    pub server_handle: ServerHandle,

    /// Status of the value.
    pub status: StatusCode,

    /// The value.
    pub value: Variant,

    /// Source timestamp.
    pub source_timestamp: Option<DateTime<Utc>>,

    /// Server timestamp.
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl RawNotification {
    /// Creates a good notification without timestamps.
    pub fn new(server_handle: ServerHandle, value: impl Into<Variant>) -> Self {
        Self {
            server_handle,
            status: StatusCode::GOOD,
            value: value.into(),
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets timestamps.
    pub fn with_timestamps(
        mut self,
        source: Option<DateTime<Utc>>,
        server: Option<DateTime<Utc>>,
    ) -> Self {
        self.source_timestamp = source;
        self.server_timestamp = server;
        self
    }

    /// Converts into an application notification for `client_handle`.
    pub fn into_notification(self, client_handle: ClientHandle) -> DataChangeNotification {
        DataChangeNotification {
            client_handle,
            status: self.status,
            value: self.value,
            source_timestamp: self.source_timestamp,
            server_timestamp: self.server_timestamp,
        }
    }
}

// =============================================================================
// DataChangeNotification
// =============================================================================

/// A change notification routed to its monitored item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataChangeNotification {
    /// Client handle of the monitored item.
    pub client_handle: ClientHandle,

    /// Status of the value.
    pub status: StatusCode,

    /// The value.
    pub value: Variant,

    /// Source timestamp.
    pub source_timestamp: Option<DateTime<Utc>>,

    /// Server timestamp.
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl DataChangeNotification {
    /// Creates a good notification without timestamps.
    pub fn new(client_handle: ClientHandle, value: impl Into<Variant>) -> Self {
        Self {
            client_handle,
            status: StatusCode::GOOD,
            value: value.into(),
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets timestamps.
    pub fn with_timestamps(
        mut self,
        source: Option<DateTime<Utc>>,
        server: Option<DateTime<Utc>>,
    ) -> Self {
        self.source_timestamp = source;
        self.server_timestamp = server;
        self
    }

    /// Order over (client handle, status, source timestamp, server
    /// timestamp, value).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.client_handle
            .cmp(&other.client_handle)
            .then_with(|| self.status.cmp(&other.status))
            .then_with(|| self.source_timestamp.cmp(&other.source_timestamp))
            .then_with(|| self.server_timestamp.cmp(&other.server_timestamp))
            .then_with(|| self.value.compare(&other.value))
    }
}

impl PartialEq for DataChangeNotification {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for DataChangeNotification {}

impl PartialOrd for DataChangeNotification {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataChangeNotification {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for DataChangeNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {}", self.client_handle, self.status, self.value)?;
        if let Some(ts) = self.source_timestamp {
            write!(f, " @ {}", ts.to_rfc3339())?;
        }
        Ok(())
    }
}

/// Sorts a batch of notifications and removes exact duplicates.
pub fn sort_and_dedup(mut notifications: Vec<DataChangeNotification>) -> Vec<DataChangeNotification> {
    notifications.sort_by(DataChangeNotification::compare);
    notifications.dedup();
    notifications
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn ts(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(secs, 0).single()
    }

    #[test]
    fn test_order_by_client_handle_first() {
        let a = DataChangeNotification::new(ClientHandle::new(1), 100.0).with_status(StatusCode::BAD);
        let b = DataChangeNotification::new(ClientHandle::new(2), 0.0);
        assert!(a < b);
    }

    #[test]
    fn test_order_status_before_timestamps() {
        let good_late = DataChangeNotification::new(ClientHandle::new(1), 1.0)
            .with_timestamps(ts(100), None);
        let bad_early = DataChangeNotification::new(ClientHandle::new(1), 1.0)
            .with_status(StatusCode::BAD)
            .with_timestamps(ts(1), None);
        assert!(good_late < bad_early);
    }

    #[test]
    fn test_order_absent_timestamp_first() {
        let none = DataChangeNotification::new(ClientHandle::new(1), 1.0);
        let some = DataChangeNotification::new(ClientHandle::new(1), 1.0).with_timestamps(ts(0), None);
        assert!(none < some);
    }

    #[test]
    fn test_order_value_last() {
        let a = DataChangeNotification::new(ClientHandle::new(1), 9.0).with_timestamps(ts(1), ts(1));
        let b = DataChangeNotification::new(ClientHandle::new(1), 1.0).with_timestamps(ts(1), ts(2));
        assert!(a < b);
    }

    #[test]
    fn test_sort_and_dedup() {
        let n1 = DataChangeNotification::new(ClientHandle::new(1), 1.0).with_timestamps(ts(3), None);
        let n2 = DataChangeNotification::new(ClientHandle::new(1), 2.0).with_timestamps(ts(1), None);
        let n3 = DataChangeNotification::new(ClientHandle::new(0), 3.0);

        let sorted = sort_and_dedup(vec![n1.clone(), n2.clone(), n1.clone(), n3.clone()]);
        assert_eq!(sorted, vec![n3, n2, n1]);
    }

    #[test]
    fn test_raw_into_notification() {
        let raw = RawNotification::new(ServerHandle::new(42), "on")
            .with_status(StatusCode::UNCERTAIN)
            .with_timestamps(ts(5), ts(6));
        let notification = raw.into_notification(ClientHandle::new(3));

        assert_eq!(notification.client_handle, ClientHandle::new(3));
        assert_eq!(notification.status, StatusCode::UNCERTAIN);
        assert_eq!(notification.value, Variant::from("on"));
        assert_eq!(notification.source_timestamp, ts(5));
        assert_eq!(notification.server_timestamp, ts(6));
    }

    proptest! {
        #[test]
        fn test_sorted_source_timestamps_are_monotonic(
            secs in proptest::collection::vec(0i64..1_000_000, 0..50),
        ) {
            let batch: Vec<_> = secs
                .iter()
                .map(|s| DataChangeNotification::new(ClientHandle::new(1), 0.0).with_timestamps(ts(*s), None))
                .collect();
            let sorted = sort_and_dedup(batch);
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].source_timestamp < pair[1].source_timestamp);
            }
        }

        #[test]
        fn test_compare_is_antisymmetric(
            a in (0u32..3, 0u32..2, proptest::option::of(0i64..3), any::<f64>()),
            b in (0u32..3, 0u32..2, proptest::option::of(0i64..3), any::<f64>()),
        ) {
            let make = |(h, s, t, v): (u32, u32, Option<i64>, f64)| {
                DataChangeNotification::new(ClientHandle::new(h), v)
                    .with_status(StatusCode(s << 31))
                    .with_timestamps(t.and_then(|t| ts(t)), None)
            };
            let (a, b) = (make(a), make(b));
            prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
        }
    }
}
