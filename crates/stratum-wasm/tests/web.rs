//! Browser tests for the worker bindings. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use stratum_core::Share;
use stratum_wasm::state::{JobInfo, TaskInfo};
use stratum_wasm::Worker;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const NOTIFY_PARAMS: &str = r#"[
    "bf",
    "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000",
    "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff20020862062f503253482f04b8864e5008",
    "072f736c7573682f000000000100f2052a010000001976a914d23fcdf86f7e756a64a7a9688ef9903327048ed988ac00000000",
    [],
    "00000002",
    "1c2ac4af",
    "504e86b9",
    false
]"#;

#[wasm_bindgen_test]
fn header_requires_job() {
    let worker = Worker::new("08000002", 4).unwrap();
    assert!(!worker.has_job());
    assert!(worker.header_hex(0, 0).is_err());
}

#[wasm_bindgen_test]
fn header_from_notify() {
    let mut worker = Worker::new("08000002", 4).unwrap();
    worker.set_job_json(NOTIFY_PARAMS).unwrap();
    assert!(worker.has_job());

    let header = worker.header_hex(1, 0x2a).unwrap();
    assert_eq!(header.len(), 160);
    assert!(header.starts_with("00000002"));
    assert!(header.ends_with("504e86b91c2ac4af0000002a"));

    let hash = worker.header_hash_hex(1, 0x2a).unwrap();
    assert_eq!(hash.len(), 64);
    assert_ne!(hash, worker.header_hash_hex(2, 0x2a).unwrap());

    assert_eq!(worker.midstate_hex(1).unwrap().len(), 64);
}

#[wasm_bindgen_test]
fn rejects_oversized_extranonce1() {
    assert!(Worker::with_extranonce1_width("0011223344", 8, 4).is_err());
}

#[wasm_bindgen_test]
fn clear_job_drops_work() {
    let mut worker = Worker::new("08000002", 4).unwrap();
    worker.set_job_json(NOTIFY_PARAMS).unwrap();
    assert!(worker.has_job());

    worker.clear_job();
    assert!(!worker.has_job());
    assert!(worker.job_info().is_err());
    assert!(worker.share(1, 0x2a).is_err());
}

#[wasm_bindgen_test]
fn job_info_describes_loaded_job() {
    let mut worker = Worker::new("08000002", 4).unwrap();
    worker.set_job_json(NOTIFY_PARAMS).unwrap();

    let info: JobInfo = serde_wasm_bindgen::from_value(worker.job_info().unwrap()).unwrap();
    assert_eq!(info.job_id, "bf");
    assert_eq!(info.version, "00000002");
    assert_eq!(info.ntime, "504e86b9");
    assert_eq!(info.merkle_branches, 0);
    assert_eq!(info.extranonce1, "0000000008000002");
    assert_eq!(info.extranonce2_size, 4);
}

#[wasm_bindgen_test]
fn share_for_found_nonce() {
    let mut worker = Worker::new("08000002", 4).unwrap();
    worker.set_job_json(NOTIFY_PARAMS).unwrap();

    let share: Share = serde_wasm_bindgen::from_value(worker.share(1, 0x2a).unwrap()).unwrap();
    assert_eq!(
        share,
        Share {
            job_id: "bf".into(),
            extranonce2: "01000000".into(),
            ntime: "504e86b9".into(),
            nonce: "0000002a".into(),
        }
    );
}

#[wasm_bindgen_test]
fn midstate_task_for_rolled_versions() {
    let mut worker = Worker::new("08000002", 4).unwrap();
    worker.set_job_json(NOTIFY_PARAMS).unwrap();

    let versions = worker.rolled_versions(0x1fffe000, 3).unwrap();
    assert_eq!(versions, vec![0x00000002, 0x00002002, 0x00004002]);

    let task: TaskInfo =
        serde_wasm_bindgen::from_value(worker.midstate_task(1, versions.clone()).unwrap()).unwrap();
    assert_eq!(task.job_id, "bf");
    assert_eq!(task.versions, versions);
    assert_eq!(task.midstates.len(), 3);
    assert_eq!(task.midstates[0], worker.midstate_hex(1).unwrap());
    assert_eq!(task.ntime, 0x504e86b9);
    assert!(task.tail.ends_with("504e86b91c2ac4af00000000"));
}
