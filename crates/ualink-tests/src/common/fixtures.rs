// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built test data.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ualink_client::{
    ClientConfig, ClientHandle, DataChangeNotification, MonitoredItemSettings, RawNotification,
    ServerHandle, SubscriptionSettings,
};
use ualink_core::namespace::{NamespaceTable, OPCUA_NAMESPACE_URI};
use ualink_core::types::{NodeId, QualifiedName, RelativePathElement};
use ualink_core::value::{StatusCode, Variant};

// =============================================================================
// Namespace Fixtures
// =============================================================================

/// Namespace arrays as servers report them.
pub struct NamespaceFixtures;

impl NamespaceFixtures {
    /// URI of the plant namespace.
    pub const PLANT_URI: &'static str = "urn:sylvex:plant";

    /// URI of the vendor namespace.
    pub const VENDOR_URI: &'static str = "http://vendor.example.com/UA/";

    /// Standard namespace array: OPC UA, server-local, plant, vendor.
    pub fn standard() -> Vec<String> {
        vec![
            OPCUA_NAMESPACE_URI.to_string(),
            "urn:sylvex:server".to_string(),
            Self::PLANT_URI.to_string(),
            Self::VENDOR_URI.to_string(),
        ]
    }

    /// The standard array after a server restart that reordered its namespaces.
    pub fn reordered() -> Vec<String> {
        vec![
            OPCUA_NAMESPACE_URI.to_string(),
            "urn:sylvex:server".to_string(),
            Self::VENDOR_URI.to_string(),
            Self::PLANT_URI.to_string(),
        ]
    }

    /// Array whose URIs differ from [`standard`](Self::standard) only in
    /// letter case and trailing slashes.
    pub fn unnormalized() -> Vec<String> {
        vec![
            "HTTP://OPCFOUNDATION.ORG/UA/".to_string(),
            "urn:sylvex:server/".to_string(),
            "URN:Sylvex:Plant".to_string(),
            "http://vendor.example.com/ua".to_string(),
        ]
    }

    /// Table built from [`standard`](Self::standard).
    pub fn standard_table() -> NamespaceTable {
        NamespaceTable::build(Self::standard())
    }

    /// The standard array as the value of a NamespaceArray read.
    pub fn standard_value() -> Variant {
        Variant::string_array(Self::standard())
    }

    /// Index of the plant namespace in [`standard`](Self::standard).
    pub const fn plant_index() -> u16 {
        2
    }
}

// =============================================================================
// Address Fixtures
// =============================================================================

/// Addresses used by the resolution suites.
pub struct AddressFixtures;

impl AddressFixtures {
    /// Pump speed addressed by namespace URI.
    pub fn pump_speed() -> NodeId {
        NodeId::with_uri(NamespaceFixtures::PLANT_URI, "Pump1.Speed")
    }

    /// Pump speed addressed by namespace index.
    pub fn pump_speed_by_index() -> NodeId {
        NodeId::with_index(NamespaceFixtures::plant_index(), "Pump1.Speed")
    }

    /// Numeric vendor node addressed by URI.
    pub fn vendor_counter() -> NodeId {
        NodeId::with_uri(NamespaceFixtures::VENDOR_URI, 1001u32)
    }

    /// Browse name in the plant namespace.
    pub fn pump_browse_name() -> QualifiedName {
        QualifiedName::with_uri(NamespaceFixtures::PLANT_URI, "Pump1")
    }

    /// Hierarchical path element targeting the plant pump.
    pub fn pump_path_element() -> RelativePathElement {
        RelativePathElement::hierarchical(Self::pump_browse_name())
    }

    /// NodeId in a namespace no server advertises.
    pub fn unknown_namespace() -> NodeId {
        NodeId::with_uri("urn:nowhere", "Ghost")
    }
}

// =============================================================================
// Settings Fixtures
// =============================================================================

/// Client configuration presets.
pub struct SettingsFixtures;

impl SettingsFixtures {
    /// Fast subscription for tests.
    pub fn fast_subscription() -> SubscriptionSettings {
        SubscriptionSettings::with_interval(std::time::Duration::from_millis(100))
    }

    /// Monitored item sampling every 50ms.
    pub fn fast_item() -> MonitoredItemSettings {
        MonitoredItemSettings::with_sampling_interval(std::time::Duration::from_millis(50))
            .with_queue_size(1)
    }

    /// Configuration with small limits.
    pub fn limited(max_monitored_items: usize, max_subscriptions: usize) -> ClientConfig {
        ClientConfig::builder()
            .max_monitored_items(max_monitored_items)
            .max_subscriptions(max_subscriptions)
            .build()
            .expect("limited config should be valid")
    }
}

// =============================================================================
// Notification Fixtures
// =============================================================================

/// Notification batches.
pub struct NotificationFixtures;

impl NotificationFixtures {
    /// Fixed base timestamp.
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Timestamp `offset_ms` after [`base_time`](Self::base_time).
    pub fn at(offset_ms: i64) -> DateTime<Utc> {
        Self::base_time() + Duration::milliseconds(offset_ms)
    }

    /// `count` good raw notifications for `server_handle` with rising
    /// values and source timestamps 100ms apart.
    pub fn series(server_handle: ServerHandle, count: usize) -> Vec<RawNotification> {
        (0..count)
            .map(|i| {
                let offset = i as i64 * 100;
                RawNotification::new(server_handle, i as f64)
                    .with_timestamps(Some(Self::at(offset)), Some(Self::at(offset + 5)))
            })
            .collect()
    }

    /// Application notifications for `client_handle` in shuffled timestamp
    /// order, including one exact duplicate.
    pub fn unordered(client_handle: ClientHandle) -> Vec<DataChangeNotification> {
        let make = |offset: i64, value: f64| {
            DataChangeNotification::new(client_handle, value)
                .with_timestamps(Some(Self::at(offset)), None)
        };
        vec![
            make(300, 3.0),
            make(100, 1.0),
            make(200, 2.0),
            make(100, 1.0),
            DataChangeNotification::new(client_handle, 0.0).with_status(StatusCode::UNCERTAIN),
        ]
    }
}
