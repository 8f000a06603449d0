//! # Filtering Broker
//!
//! Holds the subscription registry and fans published events out to every
//! queue whose policy matches the event's routing attributes.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{Event, RoutingAttributes};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::policy::SubscriptionFilterPolicy;
use crate::queue::{EventQueue, QueueError};
use crate::transport::{EventTransport, TransportError};
use crate::{DEFAULT_MAX_MESSAGE_BYTES, MAX_ROUTING_ATTRIBUTES};

/// Errors from subscription management.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// An identical policy is already registered to the same queue.
    #[error("Subscription with identical policy already registered to queue {queue}")]
    DuplicateSubscription { queue: String },
}

/// Opaque identifier of a registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionHandle(Uuid);

impl SubscriptionHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A failed append to one matching queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub subscription: SubscriptionHandle,
    pub queue: String,
    pub error: QueueError,
}

/// Outcome of one publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Id assigned to the message; shared by every queue it reached.
    pub message_id: Uuid,
    /// Every subscription whose policy matched.
    pub matched: Vec<SubscriptionHandle>,
    /// Matching subscriptions whose queue refused the append.
    pub failures: Vec<DeliveryFailure>,
}

impl PublishReceipt {
    /// Number of queues the event was actually appended to.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.matched.len() - self.failures.len()
    }

    /// True when no policy matched and the event was dropped.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Broker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Maximum serialized event body size in bytes.
    pub max_message_bytes: usize,
    /// Maximum routing attributes per message.
    pub max_attributes: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_attributes: MAX_ROUTING_ATTRIBUTES,
        }
    }
}

/// Broker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerStats {
    /// Messages accepted for fan-out.
    pub published: u64,
    /// Successful queue appends.
    pub delivered: u64,
    /// Messages that matched no policy.
    pub unmatched: u64,
    /// Messages refused before fan-out.
    pub rejected: u64,
    /// Failed queue appends.
    pub delivery_failures: u64,
}

#[derive(Clone)]
struct Subscription {
    handle: SubscriptionHandle,
    name: String,
    policy: SubscriptionFilterPolicy,
    queue: Arc<EventQueue>,
}

/// In-process attribute-filtering broker.
///
/// Policies are evaluated fresh on every publish; nothing is cached between
/// calls. The registry lock is released before any queue is touched.
pub struct FilteringBroker {
    config: BrokerConfig,
    subscriptions: RwLock<Vec<Subscription>>,
    closed: AtomicBool,
    published: AtomicU64,
    delivered: AtomicU64,
    unmatched: AtomicU64,
    rejected: AtomicU64,
    delivery_failures: AtomicU64,
}

impl FilteringBroker {
    /// Create a broker with no subscriptions.
    #[must_use]
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            subscriptions: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            unmatched: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
        }
    }

    /// Create a broker from a static subscription list.
    ///
    /// # Errors
    ///
    /// - `BrokerError::DuplicateSubscription` - the list repeats a policy/queue pair
    pub fn with_subscriptions<I>(config: BrokerConfig, subscriptions: I) -> Result<Self, BrokerError>
    where
        I: IntoIterator<Item = (String, SubscriptionFilterPolicy, Arc<EventQueue>)>,
    {
        let broker = Self::new(config);
        for (name, policy, queue) in subscriptions {
            broker.register_subscription(name, policy, queue)?;
        }
        Ok(broker)
    }

    /// Register a policy/queue pair.
    ///
    /// # Errors
    ///
    /// - `BrokerError::DuplicateSubscription` - identical policy already bound to `queue`
    pub fn register_subscription(
        &self,
        name: impl Into<String>,
        policy: SubscriptionFilterPolicy,
        queue: Arc<EventQueue>,
    ) -> Result<SubscriptionHandle, BrokerError> {
        let name = name.into();
        let mut subs = self.subscriptions.write();

        let duplicate = subs
            .iter()
            .any(|s| Arc::ptr_eq(&s.queue, &queue) && s.policy == policy);
        if duplicate {
            return Err(BrokerError::DuplicateSubscription {
                queue: queue.name().to_string(),
            });
        }

        let handle = SubscriptionHandle::new();
        info!(
            subscription = %name,
            handle = %handle,
            queue = queue.name(),
            policy = ?policy,
            "Subscription registered"
        );
        subs.push(Subscription {
            handle,
            name,
            policy,
            queue,
        });
        Ok(handle)
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unregister_subscription(&self, handle: SubscriptionHandle) -> bool {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| s.handle != handle);
        let removed = subs.len() != before;

        if removed {
            debug!(handle = %handle, "Subscription removed");
        }
        removed
    }

    /// Number of registered subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Name of a registered subscription.
    #[must_use]
    pub fn subscription_name(&self, handle: SubscriptionHandle) -> Option<String> {
        self.subscriptions
            .read()
            .iter()
            .find(|s| s.handle == handle)
            .map(|s| s.name.clone())
    }

    /// Stop accepting publishes. Subsequent publishes fail as unavailable.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Broker shut down");
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }

    fn reject(&self, reason: String) -> TransportError {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        TransportError::Rejected { reason }
    }

    fn check_limits(&self, event: &Event, attributes: &RoutingAttributes) -> Result<(), TransportError> {
        if attributes.len() > self.config.max_attributes {
            return Err(self.reject(format!(
                "{} routing attributes exceed limit of {}",
                attributes.len(),
                self.config.max_attributes
            )));
        }

        let size = serde_json::to_vec(event)
            .map_err(|e| self.reject(format!("serialization failed: {e}")))?
            .len();
        if size > self.config.max_message_bytes {
            return Err(self.reject(format!(
                "message of {size} bytes exceeds limit of {}",
                self.config.max_message_bytes
            )));
        }

        Ok(())
    }
}

impl Default for FilteringBroker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

#[async_trait]
impl EventTransport for FilteringBroker {
    async fn publish(
        &self,
        event: Event,
        attributes: RoutingAttributes,
    ) -> Result<PublishReceipt, TransportError> {
        if self.is_shut_down() {
            return Err(TransportError::Unavailable {
                reason: "broker shut down".to_string(),
            });
        }

        self.check_limits(&event, &attributes)?;

        let message_id = Uuid::new_v4();
        self.published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so queue appends happen outside the registry lock.
        let targets: Vec<Subscription> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.policy.matches(&attributes))
            .cloned()
            .collect();

        if targets.is_empty() {
            self.unmatched.fetch_add(1, Ordering::Relaxed);
            debug!(
                message_id = %message_id,
                request_id = %event.request_id(),
                event_type = %event.event_type(),
                "Event dropped (no matching subscription)"
            );
            return Ok(PublishReceipt {
                message_id,
                matched: Vec::new(),
                failures: Vec::new(),
            });
        }

        let mut matched = Vec::with_capacity(targets.len());
        let mut failures = Vec::new();

        for sub in targets {
            matched.push(sub.handle);
            match sub
                .queue
                .enqueue(message_id, event.clone(), attributes.clone())
            {
                Ok(()) => {
                    self.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(error) => {
                    self.delivery_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        message_id = %message_id,
                        subscription = %sub.name,
                        queue = sub.queue.name(),
                        error = %error,
                        "Delivery to queue failed"
                    );
                    failures.push(DeliveryFailure {
                        subscription: sub.handle,
                        queue: sub.queue.name().to_string(),
                        error,
                    });
                }
            }
        }

        debug!(
            message_id = %message_id,
            request_id = %event.request_id(),
            matched = matched.len(),
            failed = failures.len(),
            "Event published"
        );

        Ok(PublishReceipt {
            message_id,
            matched,
            failures,
        })
    }
}
