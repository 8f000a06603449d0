//! # Core Domain Entities
//!
//! Defines the store event and the attributes it is routed by.
//!
//! ## Clusters
//!
//! - **Event Body**: [`Event`], [`EventType`], [`OrderKind`]
//! - **Routing**: [`RoutingAttributes`] and the well-known attribute keys
//! - **Catalogues**: product categories and customer names used by generators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ValidationError;

// =============================================================================
// CATALOGUES
// =============================================================================

/// Product categories an event may reference.
pub const CATEGORIES: [&str; 16] = [
    "Books",
    "Games",
    "Mobiles",
    "Groceries",
    "Shoes",
    "Stationaries",
    "Laptops",
    "Tablets",
    "Notebooks",
    "Camera",
    "Printers",
    "Monitors",
    "Speakers",
    "Projectors",
    "Cables",
    "Furniture",
];

/// Customer names used by synthetic generators.
pub const CUSTOMER_NAMES: [&str; 11] = [
    "Aarakocra",
    "Aasimar",
    "Githzerai",
    "Gnoll",
    "Gnome",
    "Goblin",
    "Goliath",
    "Hag",
    "Half-Elf",
    "Half-Orc",
    "Halfling",
];

/// Lowest valid store identifier.
pub const MIN_STORE_ID: u8 = 1;

/// Highest valid store identifier.
pub const MAX_STORE_ID: u8 = 10;

// =============================================================================
// ROUTING ATTRIBUTE KEYS
// =============================================================================

/// Attribute carrying the event type. Spelling matches the deployed filter policies.
pub const ATTR_EVENT_TYPE: &str = "evnt_type";

/// Attribute carrying the priority shipping flag (`"True"` / `"False"`).
pub const ATTR_PRIORITY_SHIPPING: &str = "priority_shipping";

/// Attribute value for a boolean flag, capitalized as the deployed filter
/// policies expect.
#[must_use]
pub fn flag_attribute_value(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

// =============================================================================
// EVENT TYPE / ORDER KIND
// =============================================================================

/// Business category of an event. Drives all downstream routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "sales-event")]
    Sales,
    #[serde(rename = "inventory-event")]
    Inventory,
}

impl EventType {
    /// Both event types, in a stable order.
    pub const ALL: [EventType; 2] = [EventType::Sales, EventType::Inventory];

    /// Wire name used in routing attributes.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales-event",
            Self::Inventory => "inventory-event",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales-event" => Ok(Self::Sales),
            "inventory-event" => Ok(Self::Inventory),
            other => Err(ValidationError::UnknownEventType(other.to_string())),
        }
    }
}

/// Whether the event describes a new order or a return. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    NewOrder,
    IsReturn,
}

impl OrderKind {
    #[must_use]
    pub fn is_new_order(&self) -> bool {
        matches!(self, Self::NewOrder)
    }

    #[must_use]
    pub fn is_return(&self) -> bool {
        matches!(self, Self::IsReturn)
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// One business occurrence in a store.
///
/// Fields are private so identity (`request_id`) and routing (`event_type`)
/// cannot be changed once the event exists. Events are created by
/// [`crate::EventFactory`] or deserialized from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    request_id: Uuid,
    event_type: EventType,
    occurred_at: DateTime<Utc>,
    customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    store_id: Option<u8>,
    category: String,
    sku: u32,
    quantity: u32,
    /// Sales amount in cents (two fractional digits).
    sales_amount_cents: u64,
    gift_wrap: bool,
    priority_shipping: bool,
    order_kind: OrderKind,
    #[serde(default)]
    malformed: bool,
}

/// Field values for constructing an [`Event`].
///
/// `request_id` and `occurred_at` are assigned by [`Event::new`].
#[derive(Debug, Clone)]
pub struct EventBody {
    pub event_type: EventType,
    pub customer_name: String,
    pub store_id: Option<u8>,
    pub category: String,
    pub sku: u32,
    pub quantity: u32,
    pub sales_amount_cents: u64,
    pub gift_wrap: bool,
    pub priority_shipping: bool,
    pub order_kind: OrderKind,
}

impl Event {
    /// Create a well-formed (non-malformed) event.
    #[must_use]
    pub fn new(request_id: Uuid, occurred_at: DateTime<Utc>, body: EventBody) -> Self {
        Self {
            request_id,
            event_type: body.event_type,
            occurred_at,
            customer_name: body.customer_name,
            store_id: body.store_id,
            category: body.category,
            sku: body.sku,
            quantity: body.quantity,
            sales_amount_cents: body.sales_amount_cents,
            gift_wrap: body.gift_wrap,
            priority_shipping: body.priority_shipping,
            order_kind: body.order_kind,
            malformed: false,
        }
    }

    /// Mark this event as intentionally malformed. The store id is dropped.
    #[must_use]
    pub fn into_malformed(mut self) -> Self {
        self.store_id = None;
        self.malformed = true;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn store_id(&self) -> Option<u8> {
        self.store_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sku(&self) -> u32 {
        self.sku
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn sales_amount_cents(&self) -> u64 {
        self.sales_amount_cents
    }

    /// Sales amount as a decimal number of currency units.
    pub fn sales_amount(&self) -> f64 {
        self.sales_amount_cents as f64 / 100.0
    }

    pub fn gift_wrap(&self) -> bool {
        self.gift_wrap
    }

    pub fn priority_shipping(&self) -> bool {
        self.priority_shipping
    }

    pub fn order_kind(&self) -> OrderKind {
        self.order_kind
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Derive the attributes brokers route this event by.
    #[must_use]
    pub fn routing_attributes(&self) -> RoutingAttributes {
        RoutingAttributes::for_event(self.event_type, self.priority_shipping)
    }

    /// Check field presence and ranges.
    ///
    /// # Errors
    ///
    /// - `MalformedWithStoreId` - flagged malformed but still carries a store id
    /// - `MissingStoreId` - no store id (every malformed event fails here)
    /// - `StoreIdOutOfRange` - store id outside 1..=10
    /// - `UnknownCategory` - category not in [`CATEGORIES`]
    /// - `InvalidQuantity` - quantity below 1
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.malformed && self.store_id.is_some() {
            return Err(ValidationError::MalformedWithStoreId {
                request_id: self.request_id,
            });
        }

        let store_id = self.store_id.ok_or(ValidationError::MissingStoreId {
            request_id: self.request_id,
        })?;
        if !(MIN_STORE_ID..=MAX_STORE_ID).contains(&store_id) {
            return Err(ValidationError::StoreIdOutOfRange {
                request_id: self.request_id,
                store_id,
            });
        }

        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(ValidationError::UnknownCategory {
                request_id: self.request_id,
                category: self.category.clone(),
            });
        }

        if self.quantity < 1 {
            return Err(ValidationError::InvalidQuantity {
                request_id: self.request_id,
                quantity: self.quantity,
            });
        }

        Ok(())
    }
}

/// Check an event against the model invariants. See [`Event::validate`].
pub fn validate(event: &Event) -> Result<(), ValidationError> {
    event.validate()
}

// =============================================================================
// ROUTING ATTRIBUTES
// =============================================================================

/// Attribute name → string value, carried next to an event body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingAttributes(BTreeMap<String, String>);

impl RoutingAttributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The two attributes every store event carries.
    #[must_use]
    pub fn for_event(event_type: EventType, priority_shipping: bool) -> Self {
        Self::new()
            .with(ATTR_EVENT_TYPE, event_type.as_str())
            .with(ATTR_PRIORITY_SHIPPING, flag_attribute_value(priority_shipping))
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
