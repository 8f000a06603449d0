//! Synthetic event generation.
//!
//! Value ranges follow the store simulation: store ids 1..=10, SKUs
//! 18981..=189281, quantities 1..=38 and sales amounts 0.00..=100.00.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::entities::{
    Event, EventBody, EventType, OrderKind, CATEGORIES, CUSTOMER_NAMES, MAX_STORE_ID, MIN_STORE_ID,
};

const SKU_RANGE: std::ops::RangeInclusive<u32> = 18_981..=189_281;
const QUANTITY_RANGE: std::ops::RangeInclusive<u32> = 1..=38;
const MAX_SALES_CENTS: u64 = 10_000;

/// Generates syntactically valid events from one RNG stream.
///
/// Seeded factories produce the same field values on every run; request ids
/// are drawn from the same stream so they repeat too.
#[derive(Debug)]
pub struct EventFactory {
    rng: StdRng,
}

impl EventFactory {
    /// Create a factory. `None` seeds from OS entropy.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Access the underlying RNG so callers share one stream.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generate an event with a uniformly chosen event type.
    pub fn next_event(&mut self) -> Event {
        let event_type = if self.rng.gen_bool(0.5) {
            EventType::Sales
        } else {
            EventType::Inventory
        };
        self.next_event_of(event_type)
    }

    /// Generate an event of a fixed type.
    pub fn next_event_of(&mut self, event_type: EventType) -> Event {
        let rng = &mut self.rng;
        // Drawn from the factory stream so seeded runs repeat; stamped as v4.
        let request_id: Uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();

        let order_kind = if rng.gen_bool(0.5) {
            OrderKind::IsReturn
        } else {
            OrderKind::NewOrder
        };

        let body = EventBody {
            event_type,
            customer_name: pick(rng, &CUSTOMER_NAMES).to_string(),
            store_id: Some(rng.gen_range(MIN_STORE_ID..=MAX_STORE_ID)),
            category: pick(rng, &CATEGORIES).to_string(),
            sku: rng.gen_range(SKU_RANGE),
            quantity: rng.gen_range(QUANTITY_RANGE),
            sales_amount_cents: rng.gen_range(0..=MAX_SALES_CENTS),
            gift_wrap: rng.gen_bool(0.5),
            priority_shipping: rng.gen_bool(0.5),
            order_kind,
        };

        Event::new(request_id, Utc::now(), body)
    }
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new(None)
    }
}

fn pick<'a>(rng: &mut StdRng, values: &'a [&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

/// Construct one valid event from a seeded or entropy-seeded RNG.
#[must_use]
pub fn new_event(rng_seed: Option<u64>) -> Event {
    EventFactory::new(rng_seed).next_event()
}
