use sinklog::sinks::backup_path;
use sinklog::{Level, LogContext, LoggerConfig, RollingFileSink};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn rolling_context(base: &Path, max_size: u64, backups: usize) -> LogContext {
    let config = LoggerConfig {
        append_newline: false,
        ..LoggerConfig::default()
    };
    let ctx = LogContext::new(config);
    let file = base.to_string_lossy().to_string();
    let max_size = max_size.to_string();
    let backups = backups.to_string();
    ctx.add_sink(
        Box::new(RollingFileSink::new()),
        "roll",
        &["file", &file, "maxlogsize", &max_size, "maxbackupindex", &backups],
    )
    .unwrap();
    ctx
}

/// Length of one "first" entry as written by a rolling sink
fn entry_len(dir: &Path) -> u64 {
    let sample = dir.join("sample");
    let ctx = rolling_context(&sample, 1 << 20, 1);
    ctx.get_logger("roll").info(format_args!("first"));
    ctx.close_all();
    fs::metadata(&sample).unwrap().len()
}

#[test]
fn test_second_message_rolls_into_fresh_file() {
    let temp_dir = TempDir::new().unwrap();
    let entry = entry_len(temp_dir.path());

    // Room for one entry but not two
    let base = temp_dir.path().join("app");
    let ctx = rolling_context(&base, entry * 5 / 3, 2);
    let log = ctx.get_logger("roll");
    log.info(format_args!("first"));
    log.info(format_args!("secnd"));
    log.info(format_args!("third"));
    ctx.close_all();

    let live = fs::read_to_string(&base).unwrap();
    let newest = fs::read_to_string(backup_path(&base, 1)).unwrap();
    let oldest = fs::read_to_string(backup_path(&base, 2)).unwrap();
    assert!(live.ends_with("third"));
    assert!(newest.ends_with("secnd"));
    assert!(oldest.ends_with("first"));
    for contents in [&live, &newest, &oldest] {
        assert_eq!(contents.len() as u64, entry);
    }
    assert!(!backup_path(&base, 3).exists());
}

#[test]
fn test_backup_count_never_exceeds_limit() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("svc");
    let ctx = rolling_context(&base, 1, 3);

    // Every write after the first rolls the file
    let log = ctx.get_logger("svc");
    for i in 0..6 {
        log.error(format_args!("entry-{}", i));
    }
    ctx.close_all();

    for index in 1..=3 {
        assert!(backup_path(&base, index).exists(), "missing backup {}", index);
    }
    assert!(!backup_path(&base, 4).exists());

    assert!(fs::read_to_string(&base).unwrap().ends_with("entry-5"));
    assert!(fs::read_to_string(backup_path(&base, 1)).unwrap().ends_with("entry-4"));
    assert!(fs::read_to_string(backup_path(&base, 3)).unwrap().ends_with("entry-2"));
}

#[test]
fn test_fewer_rotations_than_backups() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("few");
    let ctx = rolling_context(&base, 1, 5);

    let log = ctx.get_logger("few");
    for i in 0..3 {
        log.info(format_args!("m{}", i));
    }
    ctx.close_all();

    assert!(backup_path(&base, 1).exists());
    assert!(backup_path(&base, 2).exists());
    assert!(!backup_path(&base, 3).exists());
}

#[test]
fn test_concurrent_writers_keep_every_line() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("threads");
    let ctx = Arc::new(rolling_context(&base, 64 * 1024 * 1024, 2));
    ctx.set_append_newline(true);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let log = ctx.get_logger("worker");
                for i in 0..250 {
                    log.write(Level::INFO, format_args!("thread-{} line-{}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    ctx.close_all();

    let contents = fs::read_to_string(&base).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1000);
    assert!(lines.iter().all(|line| line.contains(" - thread-")));
}

#[test]
fn test_concurrent_rotation_counts_every_byte() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("busy");
    let ctx = Arc::new(rolling_context(&base, 4096, 100));
    ctx.set_append_newline(true);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let log = ctx.get_logger("busy");
                for i in 0..100 {
                    log.info(format_args!("t{}-{}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    ctx.close_all();

    let mut total_lines = fs::read_to_string(&base).unwrap().lines().count();
    let mut index = 1;
    while backup_path(&base, index).exists() {
        let backup = fs::read_to_string(backup_path(&base, index)).unwrap();
        assert!(backup.len() as u64 <= 4096);
        total_lines += backup.lines().count();
        index += 1;
    }
    assert_eq!(total_lines, 400);
}
