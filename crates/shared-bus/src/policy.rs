//! # Subscription Filter Policies
//!
//! A policy maps attribute names to allowed-value sets. It matches when every
//! key it names is present in the routing attributes with an allowed value:
//! AND across keys, OR across each key's values, exact string equality.

use serde::{Deserialize, Serialize};
use shared_types::{
    flag_attribute_value, EventType, RoutingAttributes, ATTR_EVENT_TYPE, ATTR_PRIORITY_SHIPPING,
};
use std::collections::{BTreeMap, BTreeSet};

/// Filter for routing events to one subscription.
///
/// Serializes as `{"evnt_type": ["sales-event"]}`. An empty policy accepts
/// every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionFilterPolicy {
    conditions: BTreeMap<String, BTreeSet<String>>,
}

impl SubscriptionFilterPolicy {
    /// Create a policy that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Allow `values` for attribute `key`. Repeated calls for the same key
    /// widen its allowed set.
    #[must_use]
    pub fn allow<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.conditions
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Create a policy for specific event types.
    #[must_use]
    pub fn event_types(types: &[EventType]) -> Self {
        Self::all().allow(ATTR_EVENT_TYPE, types.iter().map(EventType::as_str))
    }

    /// Create a policy on the priority shipping flag.
    #[must_use]
    pub fn priority_shipping(flag: bool) -> Self {
        Self::all().allow(ATTR_PRIORITY_SHIPPING, [flag_attribute_value(flag)])
    }

    /// Check if an attribute set matches this policy.
    #[must_use]
    pub fn matches(&self, attributes: &RoutingAttributes) -> bool {
        self.conditions.iter().all(|(key, allowed)| {
            attributes
                .get(key)
                .is_some_and(|value| allowed.contains(value))
        })
    }

    /// Attribute keys this policy constrains.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
