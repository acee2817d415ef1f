// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client-side subscription configuration.
//!
//! - **ClientConfig**: registry limits and routing behaviour, with builder
//! - **SubscriptionSettings**: requested subscription parameters
//! - **MonitoredItemSettings**: requested sampling parameters
//!
//! Durations are (de)serialized in humantime form (`"250ms"`, `"1s"`).
//!
//! # Examples
//!
//! ```
//! use ualink_client::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .max_monitored_items(500)
//!     .suppress_duplicate_notifications(false)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.first_client_handle, 1);
//! assert_eq!(config.max_monitored_items, 500);
//! ```

use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ualink_core::error::{ConfigurationError, UaError, UaResult};

// =============================================================================
// ClientConfig
// =============================================================================

/// Configuration of the subscription state layer of one client connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// First client handle allocated by the registry.
    #[serde(default = "default_first_client_handle")]
    pub first_client_handle: u32,

    /// Maximum number of registered monitored items.
    #[serde(default = "default_max_monitored_items")]
    pub max_monitored_items: usize,

    /// Maximum number of live subscriptions.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions: usize,

    /// Drop a notification equal to the last one delivered for the same item.
    #[serde(default = "default_true")]
    pub suppress_duplicate_notifications: bool,

    /// Settings used for subscriptions created without explicit settings.
    #[serde(default)]
    pub default_subscription: SubscriptionSettings,

    /// Settings used for monitored items created without explicit settings.
    #[serde(default)]
    pub default_monitored_item: MonitoredItemSettings,
}

fn default_first_client_handle() -> u32 {
    1
}

fn default_max_monitored_items() -> usize {
    10_000
}

fn default_max_subscriptions() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates this configuration.
    pub fn validate(&self) -> UaResult<()> {
        if self.first_client_handle == 0 {
            return Err(invalid("first_client_handle", "Client handle 0 is reserved"));
        }

        if self.max_monitored_items == 0 {
            return Err(invalid(
                "max_monitored_items",
                "At least one monitored item must be allowed",
            ));
        }

        if self.max_subscriptions == 0 {
            return Err(invalid(
                "max_subscriptions",
                "At least one subscription must be allowed",
            ));
        }

        self.default_subscription.validate()?;
        self.default_monitored_item.validate()?;

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            first_client_handle: default_first_client_handle(),
            max_monitored_items: default_max_monitored_items(),
            max_subscriptions: default_max_subscriptions(),
            suppress_duplicate_notifications: true,
            default_subscription: SubscriptionSettings::default(),
            default_monitored_item: MonitoredItemSettings::default(),
        }
    }
}

fn invalid(field: &str, reason: &str) -> UaError {
    UaError::configuration(ConfigurationError::invalid_value(field, reason))
}

// =============================================================================
// ClientConfigBuilder
// =============================================================================

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    first_client_handle: Option<u32>,
    max_monitored_items: Option<usize>,
    max_subscriptions: Option<usize>,
    suppress_duplicate_notifications: Option<bool>,
    default_subscription: Option<SubscriptionSettings>,
    default_monitored_item: Option<MonitoredItemSettings>,
}

impl ClientConfigBuilder {
    /// Sets the first client handle.
    pub fn first_client_handle(mut self, handle: u32) -> Self {
        self.first_client_handle = Some(handle);
        self
    }

    /// Sets the monitored item limit.
    pub fn max_monitored_items(mut self, max: usize) -> Self {
        self.max_monitored_items = Some(max);
        self
    }

    /// Sets the subscription limit.
    pub fn max_subscriptions(mut self, max: usize) -> Self {
        self.max_subscriptions = Some(max);
        self
    }

    /// Enables or disables duplicate notification suppression.
    pub fn suppress_duplicate_notifications(mut self, suppress: bool) -> Self {
        self.suppress_duplicate_notifications = Some(suppress);
        self
    }

    /// Sets the default subscription settings.
    pub fn default_subscription(mut self, settings: SubscriptionSettings) -> Self {
        self.default_subscription = Some(settings);
        self
    }

    /// Sets the default monitored item settings.
    pub fn default_monitored_item(mut self, settings: MonitoredItemSettings) -> Self {
        self.default_monitored_item = Some(settings);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> UaResult<ClientConfig> {
        let config = ClientConfig {
            first_client_handle: self
                .first_client_handle
                .unwrap_or_else(default_first_client_handle),
            max_monitored_items: self
                .max_monitored_items
                .unwrap_or_else(default_max_monitored_items),
            max_subscriptions: self
                .max_subscriptions
                .unwrap_or_else(default_max_subscriptions),
            suppress_duplicate_notifications: self.suppress_duplicate_notifications.unwrap_or(true),
            default_subscription: self.default_subscription.unwrap_or_default(),
            default_monitored_item: self.default_monitored_item.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// SubscriptionSettings
// =============================================================================

/// Requested subscription parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionSettings {
    /// Publishing interval.
    #[serde(default = "default_publishing_interval")]
    #[serde(with = "humantime_serde")]
    pub publishing_interval: Duration,

    /// Lifetime count (number of publishing intervals before the subscription expires).
    #[serde(default = "default_lifetime_count")]
    pub lifetime_count: u32,

    /// Max keep-alive count.
    #[serde(default = "default_keepalive_count")]
    pub keepalive_count: u32,

    /// Maximum notifications per publish (0 = unlimited).
    #[serde(default)]
    pub max_notifications_per_publish: u32,

    /// Priority (higher is more important).
    #[serde(default)]
    pub priority: u8,

    /// Publishing enabled.
    #[serde(default = "default_true")]
    pub publishing_enabled: bool,
}

fn default_publishing_interval() -> Duration {
    Duration::from_millis(1000)
}

fn default_lifetime_count() -> u32 {
    60
}

fn default_keepalive_count() -> u32 {
    10
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            publishing_interval: default_publishing_interval(),
            lifetime_count: default_lifetime_count(),
            keepalive_count: default_keepalive_count(),
            max_notifications_per_publish: 0,
            priority: 0,
            publishing_enabled: true,
        }
    }
}

impl SubscriptionSettings {
    /// Creates settings with a custom publishing interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            publishing_interval: interval,
            ..Default::default()
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Validates the settings.
    ///
    /// The lifetime count has to be at least three times the keep-alive count.
    pub fn validate(&self) -> UaResult<()> {
        if self.publishing_interval.is_zero() {
            return Err(invalid(
                "publishing_interval",
                "Publishing interval must be greater than 0",
            ));
        }

        if self.keepalive_count == 0 {
            return Err(invalid("keepalive_count", "Keep-alive count must be greater than 0"));
        }

        if u64::from(self.lifetime_count) < 3 * u64::from(self.keepalive_count) {
            return Err(invalid(
                "lifetime_count",
                "Lifetime count must be at least 3 times the keep-alive count",
            ));
        }

        Ok(())
    }
}

// =============================================================================
// MonitoredItemSettings
// =============================================================================

/// Requested sampling parameters of a monitored item.
///
/// Totally ordered by [`compare`](Self::compare); deadband values compare by
/// their floating point total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredItemSettings {
    /// Sampling interval.
    #[serde(default = "default_sampling_interval")]
    #[serde(with = "humantime_serde")]
    pub sampling_interval: Duration,

    /// Server-side queue size.
    #[serde(default = "default_queue_size")]
    pub queue_size: u32,

    /// Discard the oldest value when the queue is full.
    #[serde(default = "default_true")]
    pub discard_oldest: bool,

    /// Monitoring mode.
    #[serde(default)]
    pub monitoring_mode: MonitoringMode,

    /// Deadband filter.
    #[serde(default)]
    pub deadband: DeadbandSettings,
}

fn default_sampling_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_queue_size() -> u32 {
    10
}

impl Default for MonitoredItemSettings {
    fn default() -> Self {
        Self {
            sampling_interval: default_sampling_interval(),
            queue_size: default_queue_size(),
            discard_oldest: true,
            monitoring_mode: MonitoringMode::default(),
            deadband: DeadbandSettings::default(),
        }
    }
}

impl MonitoredItemSettings {
    /// Creates settings with a custom sampling interval.
    pub fn with_sampling_interval(interval: Duration) -> Self {
        Self {
            sampling_interval: interval,
            ..Default::default()
        }
    }

    /// Sets the queue size.
    pub fn with_queue_size(mut self, queue_size: u32) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Sets the monitoring mode.
    pub fn with_monitoring_mode(mut self, mode: MonitoringMode) -> Self {
        self.monitoring_mode = mode;
        self
    }

    /// Sets the deadband filter.
    pub fn with_deadband(mut self, deadband: DeadbandSettings) -> Self {
        self.deadband = deadband;
        self
    }

    /// Validates the settings.
    pub fn validate(&self) -> UaResult<()> {
        if self.queue_size == 0 {
            return Err(invalid("queue_size", "Queue size must be greater than 0"));
        }

        match self.deadband {
            DeadbandSettings::None => {}
            DeadbandSettings::Absolute { value } => {
                if !value.is_finite() || value < 0.0 {
                    return Err(invalid(
                        "deadband",
                        "Absolute deadband must be a finite, non-negative value",
                    ));
                }
            }
            DeadbandSettings::Percent { percent } => {
                if !(0.0..=100.0).contains(&percent) {
                    return Err(invalid("deadband", "Percent deadband must be within 0-100"));
                }
            }
        }

        Ok(())
    }

    /// Order over (sampling interval, queue size, discard policy, monitoring
    /// mode, deadband).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.sampling_interval
            .cmp(&other.sampling_interval)
            .then_with(|| self.queue_size.cmp(&other.queue_size))
            .then_with(|| self.discard_oldest.cmp(&other.discard_oldest))
            .then_with(|| self.monitoring_mode.cmp(&other.monitoring_mode))
            .then_with(|| self.deadband.compare(&other.deadband))
    }
}

impl PartialEq for MonitoredItemSettings {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for MonitoredItemSettings {}

impl PartialOrd for MonitoredItemSettings {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonitoredItemSettings {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

// =============================================================================
// MonitoringMode
// =============================================================================

/// OPC UA monitoring mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringMode {
    /// Monitoring disabled.
    Disabled,

    /// Sampling enabled, reporting disabled.
    Sampling,

    /// Sampling and reporting enabled.
    #[default]
    Reporting,
}

impl MonitoringMode {
    /// Returns the OPC UA value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Sampling => 1,
            Self::Reporting => 2,
        }
    }
}

// =============================================================================
// DeadbandSettings
// =============================================================================

/// Deadband filter settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeadbandSettings {
    /// No deadband filtering.
    #[default]
    None,

    /// Report if the change exceeds an absolute value.
    Absolute {
        /// Absolute change threshold.
        value: f64,
    },

    /// Report if the change exceeds a percentage of the EU range.
    Percent {
        /// Percentage of engineering unit range (0-100).
        percent: f64,
    },
}

impl DeadbandSettings {
    /// Creates an absolute deadband.
    pub fn absolute(value: f64) -> Self {
        Self::Absolute { value }
    }

    /// Creates a percent deadband.
    pub fn percent(percent: f64) -> Self {
        Self::Percent { percent }
    }

    /// Returns `true` if this is no deadband.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    const fn tag(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Absolute { .. } => 1,
            Self::Percent { .. } => 2,
        }
    }

    /// Total order: variant first, then threshold by `f64::total_cmp`.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Absolute { value: a }, Self::Absolute { value: b }) => a.total_cmp(b),
            (Self::Percent { percent: a }, Self::Percent { percent: b }) => a.total_cmp(b),
            _ => self.tag().cmp(&other.tag()),
        }
    }
}

impl PartialEq for DeadbandSettings {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for DeadbandSettings {}

// =============================================================================
// Serde helpers
// =============================================================================

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        humantime::format_duration(*duration)
            .to_string()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.first_client_handle, 1);
        assert_eq!(config.max_monitored_items, 10_000);
        assert_eq!(config.max_subscriptions, 100);
        assert!(config.suppress_duplicate_notifications);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .first_client_handle(1000)
            .max_subscriptions(4)
            .default_subscription(SubscriptionSettings::with_interval(Duration::from_millis(100)))
            .build()
            .unwrap();

        assert_eq!(config.first_client_handle, 1000);
        assert_eq!(config.max_subscriptions, 4);
        assert_eq!(
            config.default_subscription.publishing_interval,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_builder_rejects_zero_handle() {
        let err = ClientConfig::builder().first_client_handle(0).build().unwrap_err();
        assert_eq!(err.category(), "configuration");
        assert!(err.to_string().contains("first_client_handle"));
    }

    #[test]
    fn test_subscription_settings_validation() {
        let settings = SubscriptionSettings {
            lifetime_count: 20,
            keepalive_count: 10,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = SubscriptionSettings::with_interval(Duration::ZERO);
        assert!(settings.validate().is_err());

        assert!(SubscriptionSettings::default().validate().is_ok());
    }

    #[test]
    fn test_monitored_item_settings_validation() {
        let settings = MonitoredItemSettings::default().with_deadband(DeadbandSettings::percent(150.0));
        assert!(settings.validate().is_err());

        let settings = MonitoredItemSettings::default().with_deadband(DeadbandSettings::absolute(-1.0));
        assert!(settings.validate().is_err());

        let settings = MonitoredItemSettings::default().with_queue_size(0);
        assert!(settings.validate().is_err());

        let settings = MonitoredItemSettings::default().with_deadband(DeadbandSettings::absolute(0.5));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_monitored_item_settings_order() {
        let fast = MonitoredItemSettings::with_sampling_interval(Duration::from_millis(100));
        let slow = MonitoredItemSettings::with_sampling_interval(Duration::from_secs(1));
        assert!(fast < slow);

        let plain = MonitoredItemSettings::default();
        let filtered = MonitoredItemSettings::default().with_deadband(DeadbandSettings::absolute(0.1));
        assert!(plain < filtered);
        assert_eq!(filtered, filtered.clone());
    }

    #[test]
    fn test_deadband_nan_equals_itself() {
        assert_eq!(DeadbandSettings::absolute(f64::NAN), DeadbandSettings::absolute(f64::NAN));
        assert_ne!(DeadbandSettings::absolute(1.0), DeadbandSettings::percent(1.0));
    }

    #[test]
    fn test_serde_humantime() {
        let json = r#"{
            "max_monitored_items": 50,
            "default_subscription": { "publishing_interval": "500ms" },
            "default_monitored_item": { "sampling_interval": "2s", "deadband": { "type": "percent", "percent": 5.0 } }
        }"#;

        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_monitored_items, 50);
        assert_eq!(config.first_client_handle, 1);
        assert_eq!(
            config.default_subscription.publishing_interval,
            Duration::from_millis(500)
        );
        assert_eq!(
            config.default_monitored_item.sampling_interval,
            Duration::from_secs(2)
        );
        assert_eq!(config.default_monitored_item.deadband, DeadbandSettings::percent(5.0));
        assert!(config.validate().is_ok());

        let back = serde_json::to_string(&config).unwrap();
        assert!(back.contains("\"500ms\""));
    }
}
