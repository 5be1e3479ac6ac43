// tests/logging.rs

use execshim::logging::{init_executor_logging, init_logging};

#[test]
fn test_logging_can_be_initialised_repeatedly() {
    // Whichever call installs the subscriber first, later calls are no-ops.
    init_executor_logging();
    init_executor_logging();
    assert!(init_logging(None).is_ok());
}
