//! Global subscriber installation, kept in its own test binary so the
//! library tests never install a process-wide subscriber.

use deposit_desk::observability::{init_logging, LoggingConfig};

#[test]
fn test_second_init_is_noop() {
    let config = LoggingConfig {
        level: "error".to_string(),
        ..LoggingConfig::default()
    };
    assert!(init_logging(&config));
    assert!(!init_logging(&config));
}
