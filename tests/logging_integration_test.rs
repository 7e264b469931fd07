use sinklog::{DispatchMode, Level, LogContext, LoggerConfig, SinkWrite};
use std::sync::Arc;
use std::thread;

mod common;
use common::{bodies, CaptureSink};

#[test]
fn test_global_threshold_filters_before_sinks() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();
    ctx.set_debug_level(Level::WARNING);

    let log = ctx.get_logger("scenario");
    log.debug(format_args!("debug"));
    log.info(format_args!("info"));
    log.warning(format_args!("warning"));
    log.error(format_args!("error"));

    assert_eq!(bodies(&messages), vec!["warning", "error"]);
    let levels: Vec<Level> = messages.lock().unwrap().iter().map(|m| m.0).collect();
    assert_eq!(levels, vec![Level::WARNING, Level::ERROR]);
}

#[test]
fn test_threshold_boundary() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();
    ctx.set_debug_level(Level(250));

    let log = ctx.get_logger("boundary");
    log.write(Level(249), format_args!("below"));
    log.write(Level(250), format_args!("at"));
    log.write(Level(251), format_args!("above"));

    assert_eq!(bodies(&messages), vec!["at", "above"]);
}

#[test]
fn test_sink_thresholds_are_independent() {
    let ctx = LogContext::default();
    let (all, all_messages) = CaptureSink::new();
    let (errors, error_messages) = CaptureSink::new();
    ctx.add_sink(Box::new(all), "all", &[]).unwrap();
    ctx.add_sink(Box::new(errors), "errors", &["debuglevel", "ERROR"]).unwrap();

    let log = ctx.get_logger("fanout");
    let report = log.info(format_args!("note"));
    assert_eq!(report.written, 1);
    assert_eq!(report.filtered, 1);
    log.critical(format_args!("boom"));

    assert_eq!(bodies(&all_messages), vec!["note", "boom"]);
    assert_eq!(bodies(&error_messages), vec!["boom"]);
}

#[test]
fn test_disabling_one_logger_leaves_others() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();

    let a = ctx.get_logger("a");
    let b = ctx.get_logger("b");
    ctx.disable_logger("a");

    a.error(format_args!("from a"));
    b.error(format_args!("from b"));
    assert_eq!(bodies(&messages), vec!["from b"]);

    ctx.enable_all_loggers();
    a.error(format_args!("a again"));
    assert_eq!(bodies(&messages), vec!["from b", "a again"]);
}

#[test]
fn test_auto_prefix_identity_and_header() {
    let config = LoggerConfig {
        auto_prefix: true,
        ..LoggerConfig::default()
    };
    let ctx = LogContext::new(config);
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();

    let first = ctx.get_logger("MyClass::function");
    let second = ctx.get_logger("MyClass::function");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "function");
    assert_eq!(first.prefix(), Some("MyClass"));

    first.info(format_args!("prefixed"));
    ctx.get_logger("plain").info(format_args!("blank"));

    let captured = messages.lock().unwrap();
    assert!(captured[0].1.contains(&format!("::{:>16}]", "MyClass")));
    assert!(captured[0].1.contains(&format!(" {:>32} - ", "function")));
    assert!(captured[1].1.contains(&format!("::{}]", " ".repeat(16))));
}

#[test]
fn test_indent_applies_to_header_only() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();

    let log = ctx.get_logger("nested");
    {
        let _scope = log.scope();
        log.info(format_args!("inside"));
    }
    log.info(format_args!("outside"));

    let captured = messages.lock().unwrap();
    assert!(captured[0].1.ends_with(" -   "));
    assert_eq!(captured[0].2, "inside\n");
    assert!(captured[1].1.ends_with(" - "));
}

#[test]
fn test_write_line_bypasses_global_threshold() {
    let ctx = LogContext::default();
    let (open, open_messages) = CaptureSink::new();
    let (strict, strict_messages) = CaptureSink::new();
    ctx.add_sink(Box::new(open), "open", &[]).unwrap();
    ctx.add_sink(Box::new(strict), "strict", &["debuglevel", "INFO"]).unwrap();
    ctx.set_debug_level(Level::CRITICAL);

    let log = ctx.get_logger("banner");
    log.write_line(format_args!("=== start ==="));

    assert_eq!(bodies(&open_messages), vec!["=== start ==="]);
    assert!(strict_messages.lock().unwrap().is_empty());
}

#[test]
fn test_long_message_is_not_truncated() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();

    let long = "x".repeat(10_000);
    ctx.get_logger("big").info(format_args!("{}", long));
    assert_eq!(bodies(&messages), vec![long]);
}

#[test]
fn test_remove_sink_stops_delivery() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();

    let log = ctx.get_logger("x");
    log.info(format_args!("kept"));
    assert!(ctx.remove_sink("capture"));
    assert_eq!(log.info(format_args!("gone")).written, 0);
    assert_eq!(bodies(&messages), vec!["kept"]);
}

#[test]
fn test_macros_through_context() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "capture", &[]).unwrap();
    ctx.set_debug_level(Level::INFO);

    let log = ctx.get_logger("macros");
    sinklog::debug!(log, "hidden {}", 1);
    sinklog::info!(log, "shown {}", 2);
    sinklog::error!(log, "shown {}", 3);

    assert_eq!(bodies(&messages), vec!["shown 2", "shown 3"]);
    assert_eq!(
        ctx.sinks().with_sink("capture", |s| s.write(Level::NONE, "", "")),
        Some(SinkWrite::Written(0))
    );
}

#[test]
fn test_leveled_write_line_bypasses_global_threshold() {
    let ctx = LogContext::default();
    let (sink, messages) = CaptureSink::new();
    ctx.add_sink(Box::new(sink), "warn", &["debuglevel", "WARNING"]).unwrap();
    ctx.set_debug_level(Level::CRITICAL);

    let log = ctx.get_logger("banner");
    log.error(format_args!("gated"));
    log.write_line_at(Level::ERROR, format_args!("delivered"));
    log.write_line_at(Level::INFO, format_args!("below sink"));
    sinklog::write_line!(log, level = Level::WARNING, "macro {}", 1);

    assert_eq!(bodies(&messages), vec!["delivered", "macro 1"]);
    let levels: Vec<Level> = messages.lock().unwrap().iter().map(|m| m.0).collect();
    assert_eq!(levels, vec![Level::ERROR, Level::WARNING]);
}

#[test]
fn test_serialized_dispatch_keeps_sinks_in_same_order() {
    let config = LoggerConfig {
        dispatch: DispatchMode::Serialized,
        ..LoggerConfig::default()
    };
    let ctx = Arc::new(LogContext::new(config));
    let (first, first_messages) = CaptureSink::new();
    let (second, second_messages) = CaptureSink::new();
    ctx.add_sink(Box::new(first), "first", &[]).unwrap();
    ctx.add_sink(Box::new(second), "second", &[]).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let log = ctx.get_logger("ordered");
                for i in 0..200 {
                    log.info(format_args!("thread-{} msg-{}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let first_bodies = bodies(&first_messages);
    assert_eq!(first_bodies.len(), 1600);
    assert_eq!(first_bodies, bodies(&second_messages));
}
