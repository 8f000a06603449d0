//! Static subscription list and broker construction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_bus::{
    BrokerConfig, BrokerError, EventQueue, FilteringBroker, QueueConfig, SubscriptionFilterPolicy,
};
use shared_types::{EventType, TimeSource};
use tracing::info;

/// Queue receiving sales events.
pub const SALES_QUEUE: &str = "sales_q";

/// Queue receiving inventory events.
pub const INVENTORY_QUEUE: &str = "inventory_q";

/// One queue and the policy that feeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub queue: String,
    pub policy: SubscriptionFilterPolicy,
}

impl SubscriptionSpec {
    pub fn new(queue: impl Into<String>, policy: SubscriptionFilterPolicy) -> Self {
        Self {
            queue: queue.into(),
            policy,
        }
    }
}

/// The two queues of the store pipeline, one per event type.
pub fn default_subscriptions() -> Vec<SubscriptionSpec> {
    vec![
        SubscriptionSpec::new(
            SALES_QUEUE,
            SubscriptionFilterPolicy::event_types(&[EventType::Sales]),
        ),
        SubscriptionSpec::new(
            INVENTORY_QUEUE,
            SubscriptionFilterPolicy::event_types(&[EventType::Inventory]),
        ),
    ]
}

/// A broker together with the queues it fans out to.
pub struct WiredBroker {
    pub broker: Arc<FilteringBroker>,
    pub queues: Vec<Arc<EventQueue>>,
}

/// Create one queue per spec and register it with a new broker.
pub fn wire_broker(
    broker_config: BrokerConfig,
    queue_config: &QueueConfig,
    specs: &[SubscriptionSpec],
    clock: Arc<dyn TimeSource>,
) -> Result<WiredBroker, BrokerError> {
    let queues: Vec<Arc<EventQueue>> = specs
        .iter()
        .map(|spec| {
            Arc::new(EventQueue::new(
                spec.queue.clone(),
                queue_config.clone(),
                Arc::clone(&clock),
            ))
        })
        .collect();

    let broker = FilteringBroker::with_subscriptions(
        broker_config,
        specs
            .iter()
            .zip(&queues)
            .map(|(spec, queue)| (spec.queue.clone(), spec.policy.clone(), Arc::clone(queue))),
    )?;

    info!(
        subscriptions = broker.subscription_count(),
        queues = ?specs.iter().map(|s| s.queue.as_str()).collect::<Vec<_>>(),
        "Broker wired"
    );

    Ok(WiredBroker {
        broker: Arc::new(broker),
        queues,
    })
}
