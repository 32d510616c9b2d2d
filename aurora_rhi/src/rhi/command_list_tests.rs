//! Unit tests for command_list.rs

use crate::error::Error;
use crate::rhi::{no_pipeline_bound, not_recording};

#[test]
fn test_recording_errors_are_invalid_argument() {
    match not_recording("draw") {
        Error::InvalidArgument(msg) => assert!(msg.contains("draw")),
        other => panic!("unexpected error: {:?}", other),
    }
    match no_pipeline_bound("draw_indexed") {
        Error::InvalidArgument(msg) => {
            assert!(msg.contains("draw_indexed"));
            assert!(msg.contains("pipeline"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
