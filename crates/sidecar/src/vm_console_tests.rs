use super::*;

#[tokio::test]
async fn write_read_roundtrip_preserves_kind_and_payload() {
    let frame = ConsoleFrame { kind: ConsoleFrameKind::Exec, payload: b"ls -la".to_vec() };
    let mut buffer = Vec::new();
    write_frame(&mut buffer, &frame).await.expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_frame(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, frame);
}

#[tokio::test]
async fn payload_containing_reserved_bytes_does_not_desync_the_stream() {
    // A terminal payload that happens to start with bytes resembling another
    // frame's header must not confuse the reader, since length is explicit.
    let frame = ConsoleFrame { kind: ConsoleFrameKind::Terminal, payload: vec![1, 0, 0, 0, 99, b'x'] };
    let mut buffer = Vec::new();
    write_frame(&mut buffer, &frame).await.expect("write failed");
    write_frame(&mut buffer, &ConsoleFrame { kind: ConsoleFrameKind::System, payload: b"ok".to_vec() }).await.expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let first = read_frame(&mut cursor).await.expect("read failed");
    let second = read_frame(&mut cursor).await.expect("read failed");
    assert_eq!(first, frame);
    assert_eq!(second.kind, ConsoleFrameKind::System);
    assert_eq!(second.payload, b"ok");
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_allocating() {
    let frame = ConsoleFrame { kind: ConsoleFrameKind::Json, payload: vec![0u8; (MAX_FRAME_LEN + 1) as usize] };
    let mut buffer = Vec::new();
    let err = write_frame(&mut buffer, &frame).await.expect_err("should reject oversized frame");
    assert!(matches!(err, ConsoleFrameError::TooLarge(_)));
}

#[tokio::test]
async fn unknown_kind_tag_is_rejected() {
    let mut buffer = vec![9u8]; // invalid kind tag
    buffer.extend_from_slice(&0u32.to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_frame(&mut cursor).await.expect_err("should reject unknown kind");
    assert!(matches!(err, ConsoleFrameError::UnknownKind(9)));
}
