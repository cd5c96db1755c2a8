//! Integration tests for the logger system
//!
//! These tests verify:
//! - Formatting through the console transport
//! - Level filtering and mute propagation
//! - Pipe routing, deduplication and teardown
//! - Copy isolation
//! - File transport output
//! - Registry id handling

use pipelog::prelude::*;
use pipelog::transports::{console_to, file, SharedBuffer, FILE_HEADER_PREFIX};
use pipelog::{info, LoggerError};
use serde_json::{json, Value};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn registry() -> Arc<Registry> {
    Arc::new(Registry::new())
}

/// Transport that skips muted messages and counts the ones it writes
fn strict_transport(writes: Arc<AtomicUsize>) -> Transport {
    let transport = Transport::new();
    transport.set_method(
        MethodKey::Write,
        move |msg, _| {
            if !msg.muted {
                writes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        },
        false,
    );
    transport
}

#[test]
fn test_msg_template_reaches_console_verbatim() {
    let out = SharedBuffer::new();
    let logger = Logger::builder()
        .registry(registry())
        .format("%msg")
        .transport("console", console_to(out.clone()))
        .build()
        .expect("Failed to build logger");

    logger.log("TestMessage1_$");

    assert_eq!(out.contents(), "TestMessage1_$\n");
}

#[test]
fn test_filtered_error_is_muted_without_writes() {
    let out = SharedBuffer::new();
    let writes = Arc::new(AtomicUsize::new(0));
    let sink = MemorySink::new();
    let logger = Logger::builder()
        .registry(registry())
        .format("%msg")
        .transport("console", console_to(out.clone()))
        .transport("strict", strict_transport(Arc::clone(&writes)))
        .transport("memory", sink.transport())
        .build()
        .expect("Failed to build logger");
    logger.set_level(logger.levels().get(&["INFO", "SUCCESS"]));

    logger.error("x");

    assert!(sink.messages()[0].muted);
    assert!(out.contents().is_empty());
    assert_eq!(writes.load(Ordering::SeqCst), 0);

    logger.success("y");
    assert_eq!(out.contents(), "y\n");
    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pipe_forwards_joined_segments() {
    let registry = registry();
    let sink = MemorySink::new();
    let a = Logger::builder()
        .registry(Arc::clone(&registry))
        .build()
        .expect("Failed to build A");
    let b = Logger::builder()
        .registry(registry)
        .transport("memory", sink.transport())
        .build()
        .expect("Failed to build B");

    a.pipe(&b);
    a.log("hi");

    let received = sink.written();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content.joined_segments, "hi");
    assert_eq!(received[0].source_logger, a.id());
    assert_eq!(received[0].route(), &[a.id().to_string(), b.id().to_string()]);
}

#[test]
fn test_pipe_is_idempotent() {
    let registry = registry();
    let a = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();
    let b = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();

    let first = a.pipe(&b);
    let second = a.pipe(&b);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.id(), second.id());
    assert_eq!(a.pipes().len(), 1);
    assert_eq!(registry.pipe_count(), 1);

    let reverse = b.pipe(&a);
    assert_ne!(reverse.id(), first.id());
}

#[test]
fn test_receiver_filter_mutes_piped_messages() {
    let registry = registry();
    let writes = Arc::new(AtomicUsize::new(0));
    let a = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();
    let b = Logger::builder()
        .registry(registry)
        .transport("strict", strict_transport(Arc::clone(&writes)))
        .build()
        .unwrap();
    b.set_level(b.levels().get(&["ERROR"]));
    a.pipe(&b);

    a.info("only for a");
    a.error("for both");

    assert_eq!(writes.load(Ordering::SeqCst), 1);
    assert_eq!(b.metrics().posted(), 2);
    assert_eq!(b.metrics().muted(), 1);
}

#[test]
fn test_each_pipe_gets_independent_copy() {
    let registry = registry();
    let loud = MemorySink::new();
    let quiet = MemorySink::new();
    let source = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();
    let first = Logger::builder()
        .registry(Arc::clone(&registry))
        .transport("memory", quiet.transport())
        .build()
        .unwrap();
    let second = Logger::builder()
        .registry(registry)
        .transport("memory", loud.transport())
        .build()
        .unwrap();

    source.pipe(&first).mute();
    source.pipe(&second);
    source.info("fan out");

    assert!(quiet.messages()[0].muted);
    assert!(!loud.messages()[0].muted);
}

#[test]
fn test_muted_pipe_with_unmuting_still_mutes() {
    let registry = registry();
    let sink = MemorySink::new();
    let a = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();
    let b = Logger::builder()
        .registry(registry)
        .transport("memory", sink.transport())
        .build()
        .unwrap();

    let pipe = a.pipe(&b);
    pipe.mute().enable_unmuting_messages();
    a.info("muted by pipe");
    assert!(sink.messages()[0].muted);

    pipe.unmute();
    a.mute_messages().info("muted by sender");
    assert!(!sink.messages()[1].muted);
    assert!(pipe.does_unmute_messages());
}

#[test]
fn test_copy_isolation() {
    let writes = Arc::new(AtomicUsize::new(0));
    let origin = Logger::builder()
        .registry(registry())
        .transport("strict", strict_transport(Arc::clone(&writes)))
        .build()
        .unwrap();
    let copy = origin
        .copy_builder()
        .transports(Vec::<(String, Transport)>::new())
        .build()
        .unwrap();

    copy.info("stays in the copy");
    assert_eq!(writes.load(Ordering::SeqCst), 0);
    assert_eq!(origin.metrics().posted(), 1);
    assert_eq!(origin.metrics().muted(), 1);

    copy.pipes()[0].unmute();
    copy.info("reaches the origin");
    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_copy_with_shared_transports_writes_once() {
    let writes = Arc::new(AtomicUsize::new(0));
    let origin = Logger::builder()
        .registry(registry())
        .transport("strict", strict_transport(Arc::clone(&writes)))
        .build()
        .unwrap();
    let copy = origin.create_copy().unwrap();

    copy.warn("once");
    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pipe_destroy_stops_forwarding() {
    let registry = registry();
    let sink = MemorySink::new();
    let a = Logger::builder().registry(Arc::clone(&registry)).build().unwrap();
    let b = Logger::builder()
        .registry(Arc::clone(&registry))
        .transport("memory", sink.transport())
        .build()
        .unwrap();

    let pipe = a.pipe(&b);
    pipe.destroy().expect("first destroy succeeds");
    a.info("dropped");

    assert!(sink.is_empty());
    assert!(a.pipes().is_empty());
    assert_eq!(registry.pipe_count(), 0);
    assert!(matches!(
        pipe.destroy(),
        Err(LoggerError::PipeDestroyed { .. })
    ));

    let fresh = a.pipe(&b);
    assert_ne!(fresh.id(), pipe.id());
    a.info("flows again");
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_stale_pipe_destroy_keeps_replacement_edge() {
    let registry = registry();
    let sink = MemorySink::new();
    let a = Logger::builder().registry(Arc::clone(&registry)).id("a").build().unwrap();
    let b = Logger::builder().registry(Arc::clone(&registry)).id("b").build().unwrap();
    let stale = a.pipe(&b);
    drop(b);

    let b2 = Logger::builder()
        .registry(Arc::clone(&registry))
        .id("b")
        .transport("memory", sink.transport())
        .build()
        .unwrap();
    assert_eq!(b2.id(), "b");
    let live = a.pipe(&b2);

    stale.destroy().expect("stale pipe destroys once");

    let again = a.pipe(&b2);
    assert!(Arc::ptr_eq(&live, &again));
    assert_eq!(a.pipes().len(), 1);
    assert_eq!(registry.pipe_count(), 1);

    a.info("once");
    assert_eq!(sink.written().len(), 1);
}

#[test]
fn test_pipe_cycle_terminates() {
    let registry = registry();
    let sink_a = MemorySink::new();
    let sink_b = MemorySink::new();
    let a = Logger::builder()
        .registry(Arc::clone(&registry))
        .transport("memory", sink_a.transport())
        .build()
        .unwrap();
    let b = Logger::builder()
        .registry(registry)
        .transport("memory", sink_b.transport())
        .build()
        .unwrap();

    a.pipe(&b);
    b.pipe(&a);
    a.pipe(&a);

    a.info("ping");
    assert_eq!(sink_a.len(), 1);
    assert_eq!(sink_b.len(), 1);

    b.info("pong");
    assert_eq!(sink_a.len(), 2);
    assert_eq!(sink_b.len(), 2);
}

#[test]
fn test_file_transport_writes_plain_unmuted_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let logger = Logger::builder()
        .registry(registry())
        .format("{red.bold %symbol} %msg")
        .transport("file", file(&log_file).expect("Failed to create file transport"))
        .build()
        .unwrap();
    logger.set_level(logger.levels().get(&["INFO", "ERROR"]));

    logger.info("started");
    logger.warn("filtered");
    logger.error(json!(["failed", 3, {"retry": false}]));

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with(FILE_HEADER_PREFIX));
    assert_eq!(lines[1], "[INFO] started");
    assert_eq!(lines[2], "[ERROR] failed 3 {\"retry\":false}");
    assert!(!content.contains('\u{1b}'));
}

#[test]
fn test_duplicate_transport_key_is_rejected() {
    let registry = registry();
    let result = Logger::builder()
        .registry(Arc::clone(&registry))
        .transport("out", Transport::new())
        .transport("out", Transport::new())
        .build();
    assert!(matches!(
        result,
        Err(LoggerError::DuplicateTransport { ref key }) if key == "out"
    ));
    assert_eq!(registry.logger_count(), 0);

    let logger = Logger::builder().registry(registry).build().unwrap();
    logger.add_transport("out", Transport::new()).unwrap();
    let first = logger.transport("out").unwrap();
    assert!(logger.add_transport("out", Transport::new()).is_err());
    assert!(Arc::ptr_eq(&first, &logger.transport("out").unwrap()));
}

#[test]
fn test_logger_id_reuse_and_collision() {
    let registry = registry();
    let first = Logger::builder()
        .registry(Arc::clone(&registry))
        .id("api")
        .build()
        .unwrap();
    let second = Logger::builder()
        .registry(Arc::clone(&registry))
        .id("api")
        .build()
        .unwrap();

    assert_eq!(first.id(), "api");
    assert_ne!(second.id(), "api");

    drop(first);
    let third = Logger::builder().registry(registry).id("api").build().unwrap();
    assert_eq!(third.id(), "api");
}

#[test]
fn test_custom_levels_and_symbols() {
    let sink = MemorySink::new();
    let logger = Logger::builder()
        .registry(registry())
        .format("%symbol %msg")
        .custom_levels(["yomenik"])
        .transport("memory", sink.transport())
        .build()
        .unwrap();

    let custom = logger.levels().get_one("yomenik");
    assert_eq!(custom.bits(), 16);
    assert_eq!(logger.levels().get(&["ALL"]).bits(), 31);

    logger.log_with_options("custom", EmitOptions::new().level(custom));
    logger.log_with_options("none", EmitOptions::new().level(LevelMask::NONE));

    assert_eq!(sink.plain_output(), "[YOMENIK] custom\n");
    assert!(sink.messages()[1].muted);
}

#[test]
fn test_computed_predefined_value() {
    let sink = MemorySink::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    let logger = Logger::builder()
        .registry(registry())
        .format("#%seq %msg (%len)")
        .predefined_value(
            "seq",
            PredefinedValue::computed(move |_| json!(seen.fetch_add(1, Ordering::SeqCst))),
        )
        .predefined_value(
            "len",
            PredefinedValue::computed(|msg| json!(msg.content.joined_segments.len())),
        )
        .transport("memory", sink.transport())
        .build()
        .unwrap();

    info!(logger, "abc");
    info!(logger, "de");

    assert_eq!(sink.plain_output(), "#0 abc (3)\n#1 de (2)\n");
}

#[test]
fn test_transport_callback_can_log_reentrantly() {
    let registry = registry();
    let sink = MemorySink::new();
    let side = Logger::builder()
        .registry(Arc::clone(&registry))
        .format("%msg")
        .transport("memory", sink.transport())
        .build()
        .unwrap();

    let side_ref = Arc::clone(&side);
    let relay = Transport::new();
    relay.set_method(
        MethodKey::Write,
        move |msg, _| {
            side_ref.info(format!("relayed {}", msg.content.joined_segments));
            Ok(())
        },
        false,
    );
    let main = Logger::builder()
        .registry(registry)
        .transport("relay", relay)
        .build()
        .unwrap();

    main.info("event");
    assert_eq!(sink.plain_output(), "relayed event\n");
}

#[test]
fn test_message_json_export() {
    let sink = MemorySink::new();
    let logger = Logger::builder()
        .registry(registry())
        .format("%msg")
        .transport("memory", sink.transport())
        .build()
        .unwrap();

    logger.warn(vec![json!("disk"), json!(91)]);
    let exported: Value = serde_json::from_str(&sink.messages()[0].to_json().unwrap()).unwrap();

    assert_eq!(exported["content"]["joined_segments"], "disk 91");
    assert_eq!(exported["content"]["passed_segments"][1], 91);
    assert_eq!(exported["level"], 4);
    assert_eq!(exported["muted"], false);
}
