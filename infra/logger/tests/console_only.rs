use campus_logger::{LevelFilter, Logger};

#[test]
fn console_logger_writes_no_files() {
    let logger = Logger::builder()
        .name("campus-console-only")
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert!(!logger.has_file_output());
}
