//! Backpressure specs
//!
//! Verify that bursts larger than the write queue are neither dropped nor
//! reordered.

use crate::prelude::*;

#[tokio::test]
async fn sequential_burst_keeps_every_write_in_order() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        for i in 0..200 {
            daemon.service.put("counter", &i.to_string()).await.unwrap();
        }
        let daemon = node.restart(daemon).await;

        // Only in-order replay leaves the final value behind
        assert_eq!(daemon.service.get("counter").unwrap(), "199", "{backend:?}");
        assert_eq!(daemon.replay.applied, 200);
        assert_eq!(daemon.replay.last_sequence, 200);
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn file_records_carry_consecutive_sequences() {
    let node = Node::new(Backend::File);
    let daemon = node.start().await;

    for i in 0..64 {
        daemon.service.put(&format!("k{i}"), "v").await.unwrap();
    }
    daemon.shutdown().await;

    let content = std::fs::read_to_string(node.log_path()).unwrap();
    let sequences: Vec<u64> = content
        .lines()
        .map(|line| line.split('\t').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(sequences, (1..=64).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_lose_nothing() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        let mut tasks = Vec::new();
        for writer in 0..8 {
            let service = daemon.service.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..25 {
                    service
                        .put(&format!("w{writer}-{i}"), &format!("{writer}:{i}"))
                        .await
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        let daemon = node.restart(daemon).await;

        let expected: std::collections::BTreeMap<String, String> = (0..8)
            .flat_map(|w| (0..25).map(move |i| (format!("w{w}-{i}"), format!("{w}:{i}"))))
            .collect();
        similar_asserts::assert_eq!(snapshot(&daemon), expected);
        assert_eq!(daemon.replay.last_sequence, 200);
        daemon.shutdown().await;
    }
}
