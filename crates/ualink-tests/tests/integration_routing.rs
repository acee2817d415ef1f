// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Notification routing integration tests.
//!
//! - End-to-end delivery from server handle to stream
//! - Per-item FIFO order and stream termination
//! - Dropped, duplicate and undeliverable notifications
//! - Canonical ordering of notification batches

use std::time::Duration;

use ualink_client::{sort_and_dedup, ClientConfig, ServerHandle};
use ualink_core::value::{StatusCode, Variant};
use ualink_tests::common::assertions::{
    expect_end, expect_next, NotificationAssertions, NotificationCollectionAssertions,
    OptionAssertions, ResultAssertions,
};
use ualink_tests::common::builders::{ConnectionBuilder, RawNotificationBuilder};
use ualink_tests::common::fixtures::NotificationFixtures;
use ualink_tests::common::init_test_logging;

const TIMEOUT: Duration = Duration::from_secs(1);

// =============================================================================
// Delivery
// =============================================================================

#[tokio::test]
async fn test_notification_reaches_its_stream() {
    init_test_logging();

    let fixture = ConnectionBuilder::new()
        .confirmed_item(100)
        .confirmed_item(200)
        .build();
    let pump = fixture.item(100);
    let valve = fixture.item(200);

    let mut pump_stream = fixture.connection.notifications(pump).assert_ok();
    let mut valve_stream = fixture.connection.notifications(valve).assert_ok();

    let raw = RawNotificationBuilder::new(200)
        .value(42.5)
        .source_timestamp(NotificationFixtures::at(0))
        .build();
    let (notification, handle) = fixture.connection.on_notification_received(raw).assert_some();
    assert_eq!(handle, valve);
    notification.assert_handle(valve);

    let received = expect_next(&mut valve_stream, TIMEOUT).await;
    received.assert_handle(valve);
    received.assert_value(42.5);
    received.assert_status(StatusCode::GOOD);
    assert_eq!(received.source_timestamp, Some(NotificationFixtures::at(0)));

    assert!(pump_stream.try_next().is_none());
}

#[tokio::test]
async fn test_stream_preserves_arrival_order() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().confirmed_item(100).build();
    let handle = fixture.item(100);

    // Delivered before the stream is taken; buffered.
    for raw in NotificationFixtures::series(ServerHandle::new(100), 10) {
        assert!(fixture.deliver(raw));
    }

    let mut stream = fixture.connection.notifications(handle).assert_ok();
    for i in 0..10 {
        expect_next(&mut stream, TIMEOUT).await.assert_value(i as f64);
    }
    assert!(stream.try_next().is_none());
    assert_eq!(fixture.connection.router_stats().routed(), 10);
}

#[tokio::test]
async fn test_concurrent_producer_keeps_fifo() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().confirmed_item(100).build();
    let handle = fixture.item(100);
    let mut stream = fixture.connection.notifications(handle).assert_ok();
    let connection = std::sync::Arc::new(fixture.connection);

    let producer = {
        let connection = std::sync::Arc::clone(&connection);
        tokio::spawn(async move {
            for i in 0..500 {
                connection.on_notification_received(
                    RawNotificationBuilder::new(100).value(i).build(),
                );
                if i % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    for i in 0..500 {
        expect_next(&mut stream, TIMEOUT).await.assert_value(i);
    }
    producer.await.expect("producer panicked");
}

#[tokio::test]
async fn test_stream_ends_when_item_removed() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().confirmed_item(100).build();
    let handle = fixture.item(100);
    let mut stream = fixture.connection.notifications(handle).assert_ok();

    fixture.deliver(RawNotificationBuilder::new(100).value(1).build());
    fixture.connection.remove_monitored_item(handle).assert_ok();

    expect_next(&mut stream, TIMEOUT).await.assert_value(1);
    expect_end(&mut stream, TIMEOUT).await;

    // The server handle is no longer known.
    assert!(!fixture.deliver(RawNotificationBuilder::new(100).value(2).build()));
    assert_eq!(fixture.connection.router_stats().dropped(), 1);
}

#[tokio::test]
async fn test_streams_end_when_subscription_deleted() {
    init_test_logging();

    let fixture = ConnectionBuilder::new()
        .confirmed_item(100)
        .confirmed_item(200)
        .build();
    let mut first = fixture.connection.notifications(fixture.item(100)).assert_ok();
    let mut second = fixture.connection.notifications(fixture.item(200)).assert_ok();

    fixture.connection.delete_subscription(fixture.subscription).assert_ok();

    expect_end(&mut first, TIMEOUT).await;
    expect_end(&mut second, TIMEOUT).await;
}

// =============================================================================
// Dropped and Suppressed
// =============================================================================

#[test]
fn test_unknown_server_handle_is_dropped() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().confirmed_item(100).pending_items(1).build();

    assert!(!fixture.deliver(RawNotificationBuilder::new(999).value(1).build()));
    assert_eq!(fixture.connection.router_stats().dropped(), 1);
    assert_eq!(fixture.connection.router_stats().routed(), 0);
}

#[test]
fn test_duplicate_notifications_are_suppressed() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().confirmed_item(100).build();
    let raw = RawNotificationBuilder::new(100)
        .value(7)
        .source_timestamp(NotificationFixtures::at(100))
        .build();

    assert!(fixture.deliver(raw.clone()));
    assert!(!fixture.deliver(raw.clone()));
    assert!(fixture.deliver(raw.with_status(StatusCode::BAD)));

    let mut stream = fixture.connection.notifications(fixture.item(100)).assert_ok();
    let delivered = stream.drain();
    assert_eq!(delivered.len(), 2);
    delivered[1].assert_status(StatusCode::BAD);
    assert_eq!(fixture.connection.router_stats().duplicates(), 1);
}

#[test]
fn test_duplicates_pass_when_suppression_disabled() {
    init_test_logging();

    let config = ClientConfig::builder()
        .suppress_duplicate_notifications(false)
        .build()
        .assert_ok();
    let fixture = ConnectionBuilder::new()
        .config(config)
        .confirmed_item(100)
        .build();
    let raw = RawNotificationBuilder::new(100).value(7).build();

    assert!(fixture.deliver(raw.clone()));
    assert!(fixture.deliver(raw));

    let mut stream = fixture.connection.notifications(fixture.item(100)).assert_ok();
    assert_eq!(stream.drain().len(), 2);
}

#[test]
fn test_notification_after_stream_dropped_is_undeliverable() {
    init_test_logging();

    let fixture = ConnectionBuilder::new().confirmed_item(100).build();
    drop(fixture.connection.notifications(fixture.item(100)).assert_ok());

    assert!(fixture.deliver(RawNotificationBuilder::new(100).bad().build()));
    assert_eq!(fixture.connection.router_stats().undeliverable(), 1);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_sort_and_dedup_orders_by_timestamp() {
    let fixture = ConnectionBuilder::new().confirmed_item(100).build();
    let handle = fixture.item(100);

    let batch = NotificationFixtures::unordered(handle);
    let sorted = sort_and_dedup(batch);

    sorted.assert_sorted();
    sorted.assert_no_adjacent_duplicates();
    assert_eq!(sorted.len(), 4);

    let good: Vec<_> = sorted
        .iter()
        .filter(|n| n.status.is_good())
        .cloned()
        .collect();
    good.assert_values(&[Variant::from(1.0), Variant::from(2.0), Variant::from(3.0)]);
}
