use campus_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_creates_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let log_dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("campus-file-logging")
        .console(false)
        .level(LevelFilter::INFO)
        .directory(&log_dir)
        .json(true)
        .init()?;
    assert!(logger.has_file_output());

    tracing::info!(slug = "rust-101", "training rendered");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("\"slug\":\"rust-101\""), "unexpected log contents: {contents}");
    Ok(())
}
