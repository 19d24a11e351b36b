//! Stream exchange tests through the full orchestrator path.
//!
//! Large payloads and chatty compilers must never deadlock, and binary
//! payloads must arrive byte-for-byte.

#![cfg(unix)]

use proptest::prelude::*;
use protobench_spec::{parse_hex, DecodeTask, EncodeTask};
use protobench_tests::{stand_in, TestHarness, POINT_SCHEMA};

const MIB: usize = 1024 * 1024;

#[test]
fn test_megabyte_payload_with_stderr_flood() {
    let harness = TestHarness::new();
    let orchestrator = harness.stand_in(stand_in::STDERR_FLOOD);
    let message = "x: 1 ".repeat(MIB / 5 + 1);

    let result = orchestrator
        .encode(&EncodeTask::new(POINT_SCHEMA, message.as_str(), "Point"))
        .unwrap();

    assert_eq!(result.encoded.len(), message.len());
    assert_eq!(result.diagnostics.len(), MIB);
    assert!(!result.is_failure());
    harness.assert_no_leftover_workspaces();
}

#[test]
fn test_compiler_exiting_early_on_large_input() {
    let harness = TestHarness::new();
    let orchestrator = harness.stand_in(stand_in::POINT_ONLY);

    let result = orchestrator
        .decode(&DecodeTask::new(POINT_SCHEMA, vec![0u8; 4 * MIB], "Line"))
        .unwrap();

    assert!(result.is_failure());
    assert_eq!(result.diagnostics.trim(), "Type not defined: Line");
    harness.assert_no_leftover_workspaces();
}

#[test]
fn test_decode_binary_payload_reaches_compiler_intact() {
    let harness = TestHarness::new();
    let orchestrator = harness.stand_in(stand_in::HEX_DUMP);
    let payload: Vec<u8> = (0..=255u8).rev().collect();

    let result = orchestrator
        .decode(&DecodeTask::new(POINT_SCHEMA, payload.clone(), "Point"))
        .unwrap();

    assert_eq!(parse_hex(&result.decoded).unwrap(), payload);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_decode_input_is_byte_exact(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let harness = TestHarness::new();
        let orchestrator = harness.stand_in(stand_in::HEX_DUMP);

        let result = orchestrator
            .decode(&DecodeTask::new(POINT_SCHEMA, payload.clone(), "Point"))
            .unwrap();

        prop_assert_eq!(parse_hex(&result.decoded).unwrap(), payload);
    }

    #[test]
    fn prop_encode_output_is_byte_exact(text in "[ -~\n]{0,2048}") {
        let harness = TestHarness::new();
        let orchestrator = harness.stand_in(stand_in::ECHO);

        let result = orchestrator
            .encode(&EncodeTask::new(POINT_SCHEMA, text.as_str(), "Point"))
            .unwrap();

        prop_assert_eq!(result.encoded, text.into_bytes());
    }
}
