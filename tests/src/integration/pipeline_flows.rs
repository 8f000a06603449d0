//! # Pipeline Flow Tests
//!
//! End-to-end flows across producer, broker, queues and consumer.
//!
//! ```text
//! EventProducerService ──publish──→ FilteringBroker ──fan-out──→ sales_q / inventory_q
//!                                                                    │
//!                                           BatchConsumerService ←───┘ drain / requeue
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use se_01_event_producer::{EventProducerApi, EventProducerService, ProducerConfig};
    use se_02_batch_consumer::{
        BatchConsumerApi, BatchConsumerService, BatchResult, ConsumerConfig, HandlerStats,
        ProcessingError, ValidatingHandler,
    };
    use shared_bus::{
        BrokerConfig, EventQueue, EventTransport, FilteringBroker, QueueConfig,
        SubscriptionFilterPolicy,
    };
    use shared_types::{EventFactory, EventType, ManualTimeSource};

    use crate::integration::{manual_clock, queue, SelectiveHandler, TeeTransport, NOW};

    fn producer_config(seed: u64) -> ProducerConfig {
        ProducerConfig {
            seed: Some(seed),
            ..ProducerConfig::default()
        }
    }

    // =============================================================================
    // PRODUCER → BROKER → QUEUES
    // =============================================================================

    #[tokio::test]
    async fn test_events_routed_by_type() {
        let clock = manual_clock();
        let sales_q = queue("sales_q", clock.clone());
        let inventory_q = queue("inventory_q", clock.clone());
        let broker = Arc::new(
            FilteringBroker::with_subscriptions(
                BrokerConfig::default(),
                [
                    (
                        "sales".to_string(),
                        SubscriptionFilterPolicy::event_types(&[EventType::Sales]),
                        sales_q.clone(),
                    ),
                    (
                        "inventory".to_string(),
                        SubscriptionFilterPolicy::event_types(&[EventType::Inventory]),
                        inventory_q.clone(),
                    ),
                ],
            )
            .unwrap(),
        );

        let producer = EventProducerService::new(producer_config(11), broker.clone(), clock);
        let result = producer.run(NOW + 60_000, 40, 0.1).await.unwrap();

        assert_eq!(sales_q.len() as u64, result.sales_events);
        assert_eq!(inventory_q.len() as u64, result.inventory_events);
        assert_eq!(result.unmatched_messages, 0);

        for message in sales_q.drain(100).unwrap() {
            assert_eq!(message.event.event_type(), EventType::Sales);
            assert_eq!(message.attributes.get("evnt_type"), Some("sales-event"));
        }
        for message in inventory_q.drain(100).unwrap() {
            assert_eq!(message.event.event_type(), EventType::Inventory);
        }
    }

    #[tokio::test]
    async fn test_fan_out_to_overlapping_policies() {
        let clock = manual_clock();
        let all_q = queue("all_q", clock.clone());
        let priority_q = queue("priority_q", clock.clone());
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription("all", SubscriptionFilterPolicy::all(), all_q.clone())
            .unwrap();
        broker
            .register_subscription(
                "priority",
                SubscriptionFilterPolicy::priority_shipping(true),
                priority_q.clone(),
            )
            .unwrap();

        let tee = Arc::new(TeeTransport::new(Arc::new(broker)));
        let producer = EventProducerService::new(producer_config(5), tee.clone(), clock);
        producer.run(NOW + 60_000, 30, 0.0).await.unwrap();

        let expected_priority = tee
            .published()
            .iter()
            .filter(|(e, _)| e.priority_shipping())
            .count();
        assert_eq!(all_q.len(), 30);
        assert_eq!(priority_q.len(), expected_priority);

        // Both queues received the same message id for a shared event.
        let all = all_q.drain(30).unwrap();
        let priority = priority_q.drain(30).unwrap();
        for message in &priority {
            assert!(all
                .iter()
                .any(|m| m.message_id == message.message_id && m.event == message.event));
        }
    }

    #[tokio::test]
    async fn test_full_queue_does_not_block_other_queues() {
        let clock = manual_clock();
        let small_q = Arc::new(EventQueue::new(
            "small_q",
            QueueConfig {
                capacity: Some(2),
                ..QueueConfig::default()
            },
            clock.clone(),
        ));
        let big_q = queue("big_q", clock.clone());
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription("small", SubscriptionFilterPolicy::all(), small_q.clone())
            .unwrap();
        broker
            .register_subscription("big", SubscriptionFilterPolicy::all(), big_q.clone())
            .unwrap();

        let mut factory = EventFactory::new(Some(1));
        let mut failures = 0;
        for _ in 0..5 {
            let event = factory.next_event();
            let attributes = event.routing_attributes();
            let receipt = broker.publish(event, attributes).await.unwrap();
            failures += receipt.failures.len();
        }

        assert_eq!(small_q.len(), 2);
        assert_eq!(big_q.len(), 5);
        assert_eq!(failures, 3);
        assert_eq!(broker.stats().delivery_failures, 3);
    }

    // =============================================================================
    // QUEUES → CONSUMER
    // =============================================================================

    #[tokio::test]
    async fn test_validating_consumer_discards_malformed_events() {
        let clock = manual_clock();
        let sales_q = queue("sales_q", clock.clone());
        let broker = Arc::new(FilteringBroker::new(BrokerConfig::default()));
        broker
            .register_subscription(
                "sales",
                SubscriptionFilterPolicy::event_types(&[EventType::Sales]),
                sales_q.clone(),
            )
            .unwrap();

        let mut factory = EventFactory::new(Some(9));
        for i in 0..6 {
            let event = factory.next_event_of(EventType::Sales);
            let event = if i % 3 == 0 { event.into_malformed() } else { event };
            let attributes = event.routing_attributes();
            broker.publish(event, attributes).await.unwrap();
        }

        let handler = Arc::new(ValidatingHandler::new());
        let consumer =
            BatchConsumerService::new(ConsumerConfig::default(), handler.clone(), clock);

        let result = consumer.process_batch(&sales_q, 10).await.unwrap();
        assert_eq!(result.processed, 4);
        assert_eq!(result.failed, 2);
        assert_eq!((result.discarded, result.requeued), (2, 0));
        assert!(result
            .failures
            .iter()
            .all(|f| matches!(f.error, ProcessingError::Invalid(_))));
        assert!(sales_q.is_empty());
        assert_eq!(handler.stats(), HandlerStats { accepted: 4, rejected: 2 });
    }

    #[tokio::test]
    async fn test_malformed_backlog_larger_than_batch() {
        let clock = manual_clock();
        let sales_q = queue("sales_q", clock.clone());
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription("sales", SubscriptionFilterPolicy::all(), sales_q.clone())
            .unwrap();

        // Twelve malformed events ahead of four valid ones.
        let mut factory = EventFactory::new(Some(21));
        let events: Vec<_> = (0..16)
            .map(|i| {
                let event = factory.next_event();
                if i < 12 {
                    event.into_malformed()
                } else {
                    event
                }
            })
            .collect();
        for event in events {
            let attributes = event.routing_attributes();
            broker.publish(event, attributes).await.unwrap();
        }

        let handler = Arc::new(ValidatingHandler::new());
        let consumer =
            BatchConsumerService::new(ConsumerConfig::default(), handler.clone(), clock);

        let mut polls = 0;
        while !sales_q.is_empty() && polls < 10 {
            consumer.process_next_batch(&sales_q).await.unwrap();
            polls += 1;
        }

        assert_eq!(polls, 4);
        assert_eq!(handler.stats(), HandlerStats { accepted: 4, rejected: 12 });
        assert_eq!(sales_q.stats().requeued, 0);
    }

    #[tokio::test]
    async fn test_overlapping_subscriptions_each_reach_handler() {
        let clock = manual_clock();
        let audit_q = queue("audit_q", clock.clone());
        let sales_q = queue("sales_q", clock.clone());
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription("audit", SubscriptionFilterPolicy::all(), audit_q.clone())
            .unwrap();
        broker
            .register_subscription(
                "sales",
                SubscriptionFilterPolicy::event_types(&[EventType::Sales]),
                sales_q.clone(),
            )
            .unwrap();

        let tee = Arc::new(TeeTransport::new(Arc::new(broker)));
        let producer = EventProducerService::new(producer_config(13), tee.clone(), clock.clone());
        let run = producer.run(NOW + 60_000, 20, 0.0).await.unwrap();

        // One consumer serves both queues, as the runtime wires it.
        let handler = Arc::new(SelectiveHandler::default());
        let consumer = BatchConsumerService::new(ConsumerConfig::default(), handler.clone(), clock);

        let mut audit = BatchResult::default();
        while !audit_q.is_empty() {
            audit.merge(consumer.process_next_batch(&audit_q).await.unwrap());
        }
        let mut sales = BatchResult::default();
        while !sales_q.is_empty() {
            sales.merge(consumer.process_next_batch(&sales_q).await.unwrap());
        }

        assert_eq!(audit.processed, 20);
        assert_eq!(sales.processed as u64, run.sales_events);
        assert_eq!(sales.duplicates, 0);

        let sales_ids: Vec<_> = tee
            .published()
            .iter()
            .filter(|(e, _)| e.event_type() == EventType::Sales)
            .map(|(e, _)| e.request_id())
            .collect();
        for id in sales_ids {
            let deliveries = handler
                .seen()
                .iter()
                .filter(|e| e.request_id() == id)
                .count();
            assert_eq!(deliveries, 2);
        }
    }

    #[tokio::test]
    async fn test_delivery_delay_and_retention() {
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let delayed_q = Arc::new(EventQueue::new(
            "delayed_q",
            QueueConfig {
                capacity: None,
                retention_ms: 60_000,
                delivery_delay_ms: 5_000,
            },
            clock.clone(),
        ));
        let broker = FilteringBroker::new(BrokerConfig::default());
        broker
            .register_subscription("delayed", SubscriptionFilterPolicy::all(), delayed_q.clone())
            .unwrap();

        let handler = Arc::new(SelectiveHandler::default());
        let consumer = BatchConsumerService::new(
            ConsumerConfig::default(),
            handler.clone(),
            clock.clone(),
        );

        let event = EventFactory::new(Some(2)).next_event();
        let id = event.request_id();
        let attributes = event.routing_attributes();
        broker.publish(event, attributes).await.unwrap();

        // Invisible until the delay elapses.
        assert!(consumer.process_batch(&delayed_q, 5).await.unwrap().is_empty());
        clock.advance(5_000);
        handler.fail_on(id);
        let result = consumer.process_batch(&delayed_q, 5).await.unwrap();
        assert_eq!(result.failed, 1);

        // Past retention the entry is discarded instead of redelivered.
        clock.advance(60_000);
        assert!(consumer.process_batch(&delayed_q, 5).await.unwrap().is_empty());
        assert_eq!(delayed_q.stats().expired, 1);
        assert!(delayed_q.is_empty());
    }

    #[tokio::test]
    async fn test_producer_stops_when_broker_shuts_down() {
        let clock = manual_clock();
        let broker = Arc::new(FilteringBroker::new(BrokerConfig::default()));
        broker.shutdown();

        let producer = EventProducerService::new(producer_config(3), broker, clock);
        let err = producer.run(NOW + 60_000, 5, 0.0).await.unwrap_err();
        assert!(err.to_string().contains("after 0 events"));
    }
}
