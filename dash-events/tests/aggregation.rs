//! Integration tests for fan-in ordering across sources.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use dash_events::{
    Aggregator, ChannelWatcher, EventSourceAdapter, HardwareAddress, PressEvent, DEFAULT_CAPACITY,
};
use proptest::prelude::*;

fn address(index: usize) -> HardwareAddress {
    HardwareAddress::parse(&format!("aa:bb:cc:dd:ee:{:02x}", index)).unwrap()
}

/// Event whose timestamp carries its sequence number within its source
fn numbered(index: usize, seq: i64) -> PressEvent {
    PressEvent::at(address(index), Utc.timestamp_opt(seq, 0).unwrap())
}

#[tokio::test]
async fn test_interleaved_arrival_order() {
    let watcher = ChannelWatcher::new();
    let a = watcher.register(address(1));
    let b = watcher.register(address(2));
    let adapters = vec![
        EventSourceAdapter::start(&watcher, "en3", a.address()).unwrap(),
        EventSourceAdapter::start(&watcher, "en3", b.address()).unwrap(),
    ];
    let (aggregator, mut events) = Aggregator::aggregate(adapters, DEFAULT_CAPACITY);

    // Space the presses out so arrival order is unambiguous
    for handle in [&a, &b, &a] {
        handle.press();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(events.recv().await.unwrap().address);
    }
    assert_eq!(seen, vec![address(1), address(2), address(1)]);

    aggregator.shutdown();
}

#[tokio::test]
async fn test_small_capacity_loses_nothing() {
    let watcher = ChannelWatcher::new();
    let a = watcher.register(address(1));
    let adapter = EventSourceAdapter::start(&watcher, "en3", a.address()).unwrap();
    let (aggregator, mut events) = Aggregator::aggregate(vec![adapter], 1);

    for seq in 0..20 {
        a.send(numbered(1, seq));
    }
    drop(a);

    for seq in 0..20 {
        let event = events.recv().await.unwrap();
        assert_eq!(event.timestamp.timestamp(), seq);
    }
    aggregator.shutdown();
    assert!(events.recv().await.is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Whatever the interleaving, each source's own order survives the merge
    #[test]
    fn prop_per_source_order_preserved(counts in prop::collection::vec(0usize..12, 1..5)) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let received = runtime.block_on(async {
            let watcher = ChannelWatcher::new();
            let handles: Vec<_> = (0..counts.len())
                .map(|index| watcher.register(address(index)))
                .collect();
            let adapters: Vec<_> = handles
                .iter()
                .map(|handle| EventSourceAdapter::start(&watcher, "en3", handle.address()).unwrap())
                .collect();
            let (aggregator, mut events) = Aggregator::aggregate(adapters, 4);

            for (index, handle) in handles.iter().enumerate() {
                for seq in 0..counts[index] {
                    handle.send(numbered(index, seq as i64));
                }
            }
            drop(handles);

            let total: usize = counts.iter().sum();
            let mut received = Vec::with_capacity(total);
            for _ in 0..total {
                received.push(events.recv().await.unwrap());
            }
            aggregator.shutdown();
            received
        });

        let mut per_source: HashMap<HardwareAddress, Vec<i64>> = HashMap::new();
        for event in received {
            per_source.entry(event.address).or_default().push(event.timestamp.timestamp());
        }
        for (index, count) in counts.iter().enumerate() {
            let expected: Vec<i64> = (0..*count as i64).collect();
            let actual = per_source.remove(&address(index)).unwrap_or_default();
            prop_assert_eq!(actual, expected);
        }
    }
}
