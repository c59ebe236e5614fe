//! Corruption specs
//!
//! Verify that a damaged log stops the daemon from starting instead of
//! serving partial state.

use crate::prelude::*;

async fn write_then_stop(node: &Node, count: usize) {
    let daemon = node.start().await;
    for i in 0..count {
        daemon.service.put(&format!("k{i}"), "v").await.unwrap();
    }
    daemon.shutdown().await;
}

#[tokio::test]
async fn repeated_sequence_refuses_to_start() {
    let node = Node::new(Backend::File);
    write_then_stop(&node, 3).await;

    // Duplicate the second record at the end
    let mut content = std::fs::read_to_string(node.log_path()).unwrap();
    let second = content.lines().nth(1).unwrap().to_string();
    content.push_str(&second);
    content.push('\n');
    std::fs::write(node.log_path(), content).unwrap();

    let err = node.start_fails().await;

    assert!(
        matches!(
            err,
            LifecycleError::Replay(LogError::OutOfSequence { last: 3, found: 2 })
        ),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn truncated_record_refuses_to_start() {
    let node = Node::new(Backend::File);
    write_then_stop(&node, 2).await;

    let mut content = std::fs::read_to_string(node.log_path()).unwrap();
    content.push_str("3\t2");
    std::fs::write(node.log_path(), content).unwrap();

    let err = node.start_fails().await;

    assert!(
        matches!(err, LifecycleError::Replay(LogError::Parse { record: 3, .. })),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn complete_record_missing_its_newline_refuses_to_start() {
    let node = Node::new(Backend::File);
    write_then_stop(&node, 2).await;

    let mut content = std::fs::read_to_string(node.log_path()).unwrap();
    content.push_str("3\t2\tk2\tv");
    std::fs::write(node.log_path(), &content).unwrap();

    let err = node.start_fails().await;

    assert!(
        matches!(err, LifecycleError::Replay(LogError::Parse { record: 3, .. })),
        "unexpected error: {err}"
    );
    // Nothing was appended onto the torn record
    assert_eq!(std::fs::read_to_string(node.log_path()).unwrap(), content);
}

#[tokio::test]
async fn startup_error_names_the_violation() {
    let node = Node::new(Backend::File);
    std::fs::write(node.log_path(), "5\t2\ta\t1\n4\t2\tb\t2\n").unwrap();

    let err = node.start_fails().await;

    assert_eq!(
        err.to_string(),
        "Transaction log replay failed: transaction numbers out of sequence: 4 after 5"
    );
}

#[tokio::test]
async fn repaired_log_starts_again() {
    let node = Node::new(Backend::File);
    std::fs::write(node.log_path(), "1\t2\ta\t1\n1\t2\tb\t2\n").unwrap();
    node.start_fails().await;

    std::fs::write(node.log_path(), "1\t2\ta\t1\n2\t2\tb\t2\n").unwrap();
    let daemon = node.start().await;

    similar_asserts::assert_eq!(snapshot(&daemon), entries(&[("a", "1"), ("b", "2")]));
    daemon.shutdown().await;
}
