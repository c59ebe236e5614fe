//! Restart specs
//!
//! Verify that acknowledged mutations survive a daemon restart.

use crate::prelude::*;

#[tokio::test]
async fn put_survives_restart() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        daemon.service.put("foo", "bar").await.unwrap();
        let daemon = node.restart(daemon).await;

        assert_eq!(daemon.service.get("foo").unwrap(), "bar", "{backend:?}");
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn delete_survives_restart() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        daemon.service.put("foo", "bar").await.unwrap();
        daemon.service.delete("foo").await.unwrap();
        let daemon = node.restart(daemon).await;

        let err = daemon.service.get("foo").unwrap_err();
        assert!(
            matches!(err, ServiceError::Store(StoreError::NoSuchKey)),
            "{backend:?}: {err}"
        );
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn overwrites_keep_the_last_value() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        daemon.service.put("color", "red").await.unwrap();
        daemon.service.put("color", "green").await.unwrap();
        daemon.service.put("shape", "square").await.unwrap();
        daemon.service.put("color", "blue").await.unwrap();
        let daemon = node.restart(daemon).await;

        similar_asserts::assert_eq!(
            snapshot(&daemon),
            entries(&[("color", "blue"), ("shape", "square")])
        );
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn state_accumulates_across_several_restarts() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let mut daemon = node.start().await;

        for round in 0..3 {
            daemon
                .service
                .put(&format!("round-{round}"), &round.to_string())
                .await
                .unwrap();
            daemon = node.restart(daemon).await;
        }

        similar_asserts::assert_eq!(
            snapshot(&daemon),
            entries(&[("round-0", "0"), ("round-1", "1"), ("round-2", "2")])
        );
        assert_eq!(daemon.replay.last_sequence, 3);
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn values_with_spaces_round_trip() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        daemon
            .service
            .put("greeting", "hello,  world and more ")
            .await
            .unwrap();
        daemon.service.put("empty", "").await.unwrap();
        let daemon = node.restart(daemon).await;

        similar_asserts::assert_eq!(
            snapshot(&daemon),
            entries(&[("empty", ""), ("greeting", "hello,  world and more ")])
        );
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn values_with_tabs_are_refused() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;

        let err = daemon.service.put("greeting", "hello,\tworld").await.unwrap_err();
        assert!(
            matches!(err, ServiceError::Log(LogError::InvalidEvent(_))),
            "{backend:?}: {err}"
        );
        let daemon = node.restart(daemon).await;

        assert!(daemon.service.store().is_empty(), "{backend:?}");
        assert_eq!(daemon.replay.applied, 0);
        daemon.shutdown().await;
    }
}

#[tokio::test]
async fn restarting_an_untouched_log_is_idempotent() {
    for backend in BACKENDS {
        let node = Node::new(backend);
        let daemon = node.start().await;
        daemon.service.put("a", "1").await.unwrap();
        daemon.service.put("b", "2").await.unwrap();
        daemon.service.delete("a").await.unwrap();

        let first = node.restart(daemon).await;
        let first_snapshot = snapshot(&first);
        let second = node.restart(first).await;

        similar_asserts::assert_eq!(snapshot(&second), first_snapshot);
        assert_eq!(second.replay.applied, 3);
        second.shutdown().await;
    }
}
