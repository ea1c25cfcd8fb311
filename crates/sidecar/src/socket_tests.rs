use super::*;

fn config() -> SocketConfig {
    SocketConfig {
        url: "ws://127.0.0.1:1/upstream".to_string(),
        task_id: "task-1".to_string(),
        heartbeat_interval: Duration::from_secs(15),
        max_reconnect_attempts: 10,
        base_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(30),
    }
}

#[test]
fn reconnect_delay_doubles_per_attempt() {
    let cfg = config();
    assert_eq!(reconnect_delay(&cfg, 1), Duration::from_millis(500));
    assert_eq!(reconnect_delay(&cfg, 2), Duration::from_millis(1_000));
    assert_eq!(reconnect_delay(&cfg, 3), Duration::from_millis(2_000));
}

#[test]
fn reconnect_delay_caps_at_max() {
    let cfg = config();
    assert_eq!(reconnect_delay(&cfg, 20), Duration::from_secs(30));
}

#[tokio::test]
async fn send_fs_change_is_best_effort_when_disconnected() {
    let client = SocketClient::new(config());
    client.send_fs_change(sbx_core::FileSystemEvent {
        path: "a.txt".to_string(),
        entry_kind: sbx_core::EntryKind::File,
        change_kind: sbx_core::ChangeKind::Modified,
        batch_timestamp_ms: 1,
    });
}
