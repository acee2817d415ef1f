// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subscription and monitored item bookkeeping records.
//!
//! Subscription lifecycle:
//!
//! ```text
//!  LocallyCreated ──► ServerConfirmed ◄──► Suspended
//!        │                   │                 │
//!        └───────────────────┴────────┬────────┘
//!                                     ▼
//!                                  Deleted
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use ualink_core::error::SubscriptionError;

use super::handle::{ClientHandle, ClientSubscriptionHandle, ConnectionId, ServerHandle};
use crate::config::{MonitoredItemSettings, SubscriptionSettings};

// =============================================================================
// SubscriptionState
// =============================================================================

/// State of a subscription.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Created locally, not yet acknowledged by the server.
    #[default]
    LocallyCreated,

    /// Acknowledged by the server and publishing.
    ServerConfirmed,

    /// Publishing suspended.
    Suspended,

    /// Deleted. Terminal.
    Deleted,
}

impl SubscriptionState {
    /// Returns `true` if moving from `self` to `target` is allowed.
    ///
    /// Staying in the current state is always allowed.
    pub const fn can_transition_to(&self, target: SubscriptionState) -> bool {
        use SubscriptionState::*;

        matches!(
            (*self, target),
            (LocallyCreated, LocallyCreated)
                | (ServerConfirmed, ServerConfirmed)
                | (Suspended, Suspended)
                | (Deleted, Deleted)
                | (LocallyCreated, ServerConfirmed)
                | (ServerConfirmed, Suspended)
                | (Suspended, ServerConfirmed)
                | (LocallyCreated, Deleted)
                | (ServerConfirmed, Deleted)
                | (Suspended, Deleted)
        )
    }

    /// Returns `true` if the subscription is in a terminal state.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Returns `true` if the server is publishing for this subscription.
    #[inline]
    pub const fn is_publishing(&self) -> bool {
        matches!(self, Self::ServerConfirmed)
    }

    /// Returns the state name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocallyCreated => "LocallyCreated",
            Self::ServerConfirmed => "ServerConfirmed",
            Self::Suspended => "Suspended",
            Self::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// SubscriptionInformation
// =============================================================================

/// Client-side record of one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInformation {
    /// Owning connection.
    pub connection_id: ConnectionId,

    /// Client subscription handle.
    pub handle: ClientSubscriptionHandle,

    /// Current state.
    pub state: SubscriptionState,

    /// Requested settings.
    pub settings: SubscriptionSettings,
}

impl SubscriptionInformation {
    /// Creates a record in the `LocallyCreated` state.
    pub fn new(
        connection_id: ConnectionId,
        handle: ClientSubscriptionHandle,
        settings: SubscriptionSettings,
    ) -> Self {
        Self {
            connection_id,
            handle,
            state: SubscriptionState::LocallyCreated,
            settings,
        }
    }

    /// Applies a state transition.
    ///
    /// Returns `Ok(false)` if `target` is the current state. A rejected
    /// transition leaves the state unchanged.
    pub fn transition_to(&mut self, target: SubscriptionState) -> Result<bool, SubscriptionError> {
        if !self.state.can_transition_to(target) {
            return Err(SubscriptionError::invalid_transition(
                self.handle.value(),
                self.state.name(),
                target.name(),
            ));
        }

        if self.state == target {
            return Ok(false);
        }

        self.state = target;
        Ok(true)
    }

    /// Order over (connection, handle, state).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.connection_id
            .cmp(&other.connection_id)
            .then_with(|| self.handle.cmp(&other.handle))
            .then_with(|| self.state.cmp(&other.state))
    }
}

impl fmt::Display for SubscriptionInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} [{}]", self.connection_id, self.handle, self.state)
    }
}

// =============================================================================
// MonitoredItemInformation
// =============================================================================

/// Client-side record of one monitored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredItemInformation {
    /// Owning connection.
    pub connection_id: ConnectionId,

    /// Owning subscription.
    pub subscription_handle: ClientSubscriptionHandle,

    /// Client handle, unique within the registry.
    pub client_handle: ClientHandle,

    /// Server handle, `None` until the server confirms the item.
    pub server_handle: Option<ServerHandle>,

    /// Requested settings.
    pub settings: MonitoredItemSettings,
}

impl MonitoredItemInformation {
    /// Returns `true` once the server has assigned a handle.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.server_handle.is_some()
    }

    /// Order over (connection, subscription, client handle, settings, server handle).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.connection_id
            .cmp(&other.connection_id)
            .then_with(|| self.subscription_handle.cmp(&other.subscription_handle))
            .then_with(|| self.client_handle.cmp(&other.client_handle))
            .then_with(|| self.settings.compare(&other.settings))
            .then_with(|| self.server_handle.cmp(&other.server_handle))
    }
}

impl fmt::Display for MonitoredItemInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} -> ",
            self.connection_id, self.subscription_handle, self.client_handle
        )?;
        match self.server_handle {
            Some(server_handle) => write!(f, "{}", server_handle),
            None => write!(f, "NOT ASSIGNED"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [SubscriptionState; 4] = [
        SubscriptionState::LocallyCreated,
        SubscriptionState::ServerConfirmed,
        SubscriptionState::Suspended,
        SubscriptionState::Deleted,
    ];

    fn info() -> SubscriptionInformation {
        SubscriptionInformation::new(
            ConnectionId::new(1),
            ClientSubscriptionHandle::new(7),
            SubscriptionSettings::default(),
        )
    }

    #[test]
    fn test_allowed_transitions() {
        let mut sub = info();
        assert_eq!(sub.transition_to(SubscriptionState::ServerConfirmed), Ok(true));
        assert_eq!(sub.transition_to(SubscriptionState::Suspended), Ok(true));
        assert_eq!(sub.transition_to(SubscriptionState::ServerConfirmed), Ok(true));
        assert_eq!(sub.transition_to(SubscriptionState::Deleted), Ok(true));
        assert_eq!(sub.state, SubscriptionState::Deleted);
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut sub = info();
        assert_eq!(sub.transition_to(SubscriptionState::LocallyCreated), Ok(false));
        assert_eq!(sub.state, SubscriptionState::LocallyCreated);
    }

    #[test]
    fn test_rejected_transition_leaves_state() {
        let mut sub = info();
        let err = sub.transition_to(SubscriptionState::Suspended).unwrap_err();
        assert_eq!(
            err,
            SubscriptionError::invalid_transition(7, "LocallyCreated", "Suspended")
        );
        assert_eq!(sub.state, SubscriptionState::LocallyCreated);
    }

    #[test]
    fn test_deleted_is_terminal() {
        for target in ALL {
            let mut sub = info();
            sub.transition_to(SubscriptionState::Deleted).unwrap();
            let result = sub.transition_to(target);
            if target == SubscriptionState::Deleted {
                assert_eq!(result, Ok(false));
            } else {
                assert!(result.is_err());
            }
            assert_eq!(sub.state, SubscriptionState::Deleted);
        }
    }

    #[test]
    fn test_any_state_can_be_deleted() {
        for state in ALL {
            assert!(state.can_transition_to(SubscriptionState::Deleted));
        }
    }

    #[test]
    fn test_nothing_returns_to_locally_created() {
        for state in ALL {
            if state != SubscriptionState::LocallyCreated {
                assert!(!state.can_transition_to(SubscriptionState::LocallyCreated));
            }
        }
    }

    #[test]
    fn test_subscription_order() {
        let mut a = info();
        let b = info();
        a.state = SubscriptionState::Deleted;
        assert_eq!(b.compare(&a), Ordering::Less);

        let mut c = info();
        c.handle = ClientSubscriptionHandle::new(1);
        assert_eq!(c.compare(&a), Ordering::Less);
    }

    #[test]
    fn test_monitored_item_display() {
        let mut item = MonitoredItemInformation {
            connection_id: ConnectionId::new(1),
            subscription_handle: ClientSubscriptionHandle::new(2),
            client_handle: ClientHandle::new(3),
            server_handle: None,
            settings: MonitoredItemSettings::default(),
        };
        assert_eq!(item.to_string(), "conn-1/sub-2/mi-3 -> NOT ASSIGNED");
        assert!(!item.is_assigned());

        item.server_handle = Some(ServerHandle::new(42));
        assert_eq!(item.to_string(), "conn-1/sub-2/mi-3 -> srv-42");
    }

    #[test]
    fn test_monitored_item_order_server_handle_last() {
        let base = MonitoredItemInformation {
            connection_id: ConnectionId::new(1),
            subscription_handle: ClientSubscriptionHandle::new(1),
            client_handle: ClientHandle::new(1),
            server_handle: Some(ServerHandle::new(1)),
            settings: MonitoredItemSettings::default(),
        };
        let mut unassigned = base.clone();
        unassigned.server_handle = None;
        assert_eq!(unassigned.compare(&base), Ordering::Less);

        let mut later = base.clone();
        later.client_handle = ClientHandle::new(2);
        later.server_handle = None;
        assert_eq!(base.compare(&later), Ordering::Less);
    }

    fn state_strategy() -> impl Strategy<Value = SubscriptionState> {
        proptest::sample::select(ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_state_reflects_last_applied_transition(
            targets in proptest::collection::vec(state_strategy(), 0..20)
        ) {
            let mut sub = info();
            let mut expected = sub.state;
            for target in targets {
                match sub.transition_to(target) {
                    Ok(_) => expected = target,
                    Err(_) => prop_assert!(!expected.can_transition_to(target)),
                }
                prop_assert_eq!(sub.state, expected);
            }
        }
    }
}
