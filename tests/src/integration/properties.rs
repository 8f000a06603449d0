//! # Pipeline Properties
//!
//! Properties that must hold for any seed, checked over many seeds rather
//! than a single fixture.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use se_01_event_producer::{EventProducerApi, EventProducerService, ProducerConfig};
    use se_02_batch_consumer::{BatchConsumerApi, BatchConsumerService, ConsumerConfig};
    use shared_bus::{
        BrokerConfig, EventQueue, EventTransport, FilteringBroker, SubscriptionFilterPolicy,
    };
    use shared_types::{new_event, Event, EventFactory, EventType, ManualTimeSource, TimeSource};
    use uuid::Uuid;

    use crate::integration::{manual_clock, queue, SelectiveHandler, TeeTransport, NOW};

    const SEEDS: std::ops::Range<u64> = 0..25;

    fn producer<T: EventTransport>(
        seed: u64,
        transport: Arc<T>,
    ) -> EventProducerService<T, ManualTimeSource> {
        EventProducerService::new(
            ProducerConfig {
                seed: Some(seed),
                ..ProducerConfig::default()
            },
            transport,
            manual_clock(),
        )
    }

    fn open_broker(clock: Arc<dyn TimeSource>) -> (Arc<FilteringBroker>, Arc<EventQueue>) {
        let all_q = queue("all_q", clock);
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription("all", SubscriptionFilterPolicy::all(), all_q.clone())
            .unwrap();
        (Arc::new(broker), all_q)
    }

    // =============================================================================
    // EVENT MODEL
    // =============================================================================

    #[tokio::test]
    async fn prop_order_kind_is_exclusive() {
        for seed in SEEDS {
            let (broker, all_q) = open_broker(manual_clock());
            producer(seed, broker).run(NOW + 60_000, 20, 0.1).await.unwrap();

            for message in all_q.drain(20).unwrap() {
                let kind = message.event.order_kind();
                assert!(kind.is_new_order() ^ kind.is_return(), "seed {seed}");
            }
        }
    }

    #[tokio::test]
    async fn prop_malformed_events_have_no_store_id() {
        for seed in SEEDS {
            let (broker, all_q) = open_broker(manual_clock());
            producer(seed, broker).run(NOW + 60_000, 20, 0.5).await.unwrap();

            for message in all_q.drain(20).unwrap() {
                if message.event.is_malformed() {
                    assert_eq!(message.event.store_id(), None, "seed {seed}");
                    assert!(message.event.validate().is_err());
                } else {
                    assert!(message.event.validate().is_ok(), "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn prop_seeded_events_are_reproducible() {
        for seed in SEEDS {
            let (a, b) = (new_event(Some(seed)), new_event(Some(seed)));
            assert_eq!(a.request_id(), b.request_id());
            assert_eq!(a.event_type(), b.event_type());
            assert_eq!(a.store_id(), b.store_id());
            assert_eq!(a.category(), b.category());
            assert_eq!(a.sku(), b.sku());
            assert_eq!(a.sales_amount_cents(), b.sales_amount_cents());
            assert_eq!(a.order_kind(), b.order_kind());
        }
    }

    // =============================================================================
    // BROKER MATCHING
    // =============================================================================

    #[tokio::test]
    async fn prop_sales_policy_matches_only_sales() {
        let clock = manual_clock();
        let sales_q = queue("sales_q", clock.clone());
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription(
                "sales",
                SubscriptionFilterPolicy::event_types(&[EventType::Sales]),
                sales_q.clone(),
            )
            .unwrap();

        let mut factory = EventFactory::new(Some(99));
        let mut sales = 0;
        for _ in 0..200 {
            let event = factory.next_event();
            if event.event_type() == EventType::Sales {
                sales += 1;
            }
            let attributes = event.routing_attributes();
            broker.publish(event, attributes).await.unwrap();
        }

        let drained = sales_q.drain(200).unwrap();
        assert_eq!(drained.len(), sales);
        assert!(drained
            .iter()
            .all(|m| m.event.event_type() == EventType::Sales));
    }

    #[tokio::test]
    async fn prop_matching_independent_of_registration_order() {
        let policies = vec![
            ("sales", SubscriptionFilterPolicy::event_types(&[EventType::Sales])),
            ("priority", SubscriptionFilterPolicy::priority_shipping(true)),
            (
                "priority_inventory",
                SubscriptionFilterPolicy::event_types(&[EventType::Inventory])
                    .allow("priority_shipping", ["True"]),
            ),
            ("everything", SubscriptionFilterPolicy::all()),
        ];

        let events: Vec<Event> = {
            let mut factory = EventFactory::new(Some(17));
            (0..100).map(|_| factory.next_event()).collect()
        };

        async fn deliveries(
            order: &[(&str, SubscriptionFilterPolicy)],
            events: &[Event],
        ) -> BTreeMap<String, Vec<Uuid>> {
            let clock = manual_clock();
            let broker = FilteringBroker::new(BrokerConfig::default());
            let mut queues = Vec::new();
            for (name, policy) in order {
                let q = queue(name, clock.clone());
                broker
                    .register_subscription(*name, policy.clone(), q.clone())
                    .unwrap();
                queues.push(q);
            }
            for event in events {
                broker
                    .publish(event.clone(), event.routing_attributes())
                    .await
                    .unwrap();
            }
            queues
                .iter()
                .map(|q| {
                    let ids = q
                        .drain(events.len())
                        .unwrap()
                        .iter()
                        .map(|m| m.event.request_id())
                        .collect();
                    (q.name().to_string(), ids)
                })
                .collect()
        }

        let forward = deliveries(&policies, &events).await;
        let mut reversed_policies = policies.clone();
        reversed_policies.reverse();
        let reversed = deliveries(&reversed_policies, &events).await;

        assert_eq!(forward, reversed);
        assert_eq!(forward["everything"].len(), 100);
    }

    // =============================================================================
    // CONSUMER
    // =============================================================================

    #[tokio::test]
    async fn prop_partial_batch_failure_scenario() {
        let clock = manual_clock();
        let work_q = queue("work_q", clock.clone());
        let (broker, _) = open_broker(clock.clone());
        broker
            .register_subscription("work", SubscriptionFilterPolicy::all(), work_q.clone())
            .unwrap();

        let tee = Arc::new(TeeTransport::new(broker));
        producer(3, tee.clone()).run(NOW + 60_000, 7, 0.0).await.unwrap();
        let ids: Vec<Uuid> = tee
            .published()
            .iter()
            .map(|(e, _)| e.request_id())
            .collect();
        assert_eq!(ids.len(), 7);

        let handler = Arc::new(SelectiveHandler::failing_on([ids[2]]));
        let consumer = BatchConsumerService::new(ConsumerConfig::default(), handler.clone(), clock);

        let first = consumer.process_batch(&work_q, 5).await.unwrap();
        assert_eq!(
            (first.processed, first.failed, first.requeued),
            (4, 1, 1)
        );

        handler.heal();
        let second = consumer.process_batch(&work_q, 5).await.unwrap();
        assert_eq!(second.processed, 3);

        let order: Vec<Uuid> = handler
            .seen()
            .iter()
            .skip(5)
            .map(Event::request_id)
            .collect();
        assert_eq!(order, vec![ids[2], ids[5], ids[6]]);
    }

    // =============================================================================
    // PRODUCER DEADLINE
    // =============================================================================

    #[tokio::test]
    async fn prop_deadline_now_emits_nothing() {
        let (broker, all_q) = open_broker(manual_clock());
        let result = producer(1, broker).run(NOW, 5, 0.1).await.unwrap();

        assert_eq!(result.total_messages, 0);
        assert!(all_q.is_empty());
    }

    // =============================================================================
    // END TO END FIDELITY
    // =============================================================================

    #[tokio::test]
    async fn prop_drained_events_identical_to_published() {
        for seed in SEEDS {
            let clock = manual_clock();
            let (broker, all_q) = open_broker(clock.clone());
            let tee = Arc::new(TeeTransport::new(broker));
            producer(seed, tee.clone()).run(NOW + 60_000, 10, 0.2).await.unwrap();

            let drained: Vec<_> = all_q
                .drain(10)
                .unwrap()
                .into_iter()
                .map(|m| (m.event, m.attributes))
                .collect();
            assert_eq!(drained, tee.published(), "seed {seed}");

            // The body survives a JSON round trip through the wire format.
            for (event, _) in &drained {
                let json = serde_json::to_string(event).unwrap();
                let decoded: Event = serde_json::from_str(&json).unwrap();
                assert_eq!(&decoded, event);
            }
        }
    }
}
