//! # Concurrency Tests
//!
//! Atomic drain and concurrent fan-out under real threads.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use shared_bus::{BrokerConfig, EventTransport, FilteringBroker, SubscriptionFilterPolicy};
    use shared_types::EventFactory;
    use uuid::Uuid;

    use crate::integration::{manual_clock, queue};

    #[test]
    fn test_single_item_never_drained_twice() {
        for _ in 0..500 {
            let q = queue("race_q", manual_clock());
            let event = EventFactory::new(None).next_event();
            let attributes = event.routing_attributes();
            q.enqueue(Uuid::new_v4(), event, attributes).unwrap();

            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let q = Arc::clone(&q);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        q.drain(1).unwrap().len()
                    })
                })
                .collect();

            let received: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
            assert_eq!(received, 1);
        }
    }

    #[test]
    fn test_concurrent_drains_partition_the_queue() {
        let q = queue("shared_q", manual_clock());
        let mut factory = EventFactory::new(Some(8));
        for _ in 0..1_000 {
            let event = factory.next_event();
            let attributes = event.routing_attributes();
            q.enqueue(Uuid::new_v4(), event, attributes).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    let mut ids = Vec::new();
                    loop {
                        let batch = q.drain(7).unwrap();
                        if batch.is_empty() {
                            break ids;
                        }
                        ids.extend(batch.into_iter().map(|m| m.message_id));
                    }
                })
            })
            .collect();

        let all: Vec<Uuid> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 1_000);
        assert_eq!(unique.len(), 1_000);
        assert!(q.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishers_keep_per_publisher_order() {
        let q = queue("fifo_q", manual_clock());
        let broker = Arc::new(FilteringBroker::new(BrokerConfig::default()));
        broker
            .register_subscription("all", SubscriptionFilterPolicy::all(), q.clone())
            .unwrap();

        let mut tasks = Vec::new();
        for publisher in 0..4u64 {
            let broker = Arc::clone(&broker);
            tasks.push(tokio::spawn(async move {
                let mut factory = EventFactory::new(Some(publisher));
                let mut sent = Vec::new();
                for _ in 0..50 {
                    let event = factory.next_event();
                    sent.push(event.request_id());
                    let attributes = event.routing_attributes();
                    broker.publish(event, attributes).await.unwrap();
                }
                sent
            }));
        }

        let mut sent = Vec::new();
        for task in tasks {
            sent.push(task.await.unwrap());
        }

        let received: Vec<Uuid> = q
            .drain(200)
            .unwrap()
            .iter()
            .map(|m| m.event.request_id())
            .collect();
        assert_eq!(received.len(), 200);

        // Each publisher's events appear in the order it published them.
        for ids in sent {
            let positions: Vec<usize> = ids
                .iter()
                .map(|id| received.iter().position(|r| r == id).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(broker.stats().delivered, 200);
    }
}
