//! Serializable views handed back to JavaScript.

use serde::{Deserialize, Serialize};
use stratum_core::{BlockHeader, MidstateTask, StratumJob, Subscription};
use stratum_core::hash::hash_to_display_hex;
use wasm_bindgen::prelude::*;

/// Summary of the job currently loaded into a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    pub job_id: String,
    pub previous_hash: String,
    pub version: String,
    pub bits: String,
    pub ntime: String,
    pub merkle_branches: usize,
    pub clean_jobs: bool,
    /// Padded extranonce1 of the session.
    pub extranonce1: String,
    pub extranonce2_size: usize,
}

impl JobInfo {
    pub fn new(job: &StratumJob, subscription: &Subscription) -> Self {
        JobInfo {
            job_id: job.job_id.clone(),
            previous_hash: hex::encode(job.previous_block_hash),
            version: hex::encode(job.version),
            bits: hex::encode(job.bits),
            ntime: hex::encode(job.time),
            merkle_branches: job.merkle_branches.len(),
            clean_jobs: job.clean_jobs,
            extranonce1: subscription.extranonce1.to_hex(),
            extranonce2_size: subscription.extranonce2_size,
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}

/// A header together with the values derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// 80 header bytes, hex.
    pub header: String,
    /// Header hash in internal byte order.
    pub hash: String,
    /// Header hash in display (reversed) order.
    pub hash_display: String,
    pub midstate: String,
}

impl HeaderInfo {
    pub fn new(header: &BlockHeader) -> Self {
        let hash = header.hash();
        HeaderInfo {
            header: hex::encode(header.serialize()),
            hash: hex::encode(hash),
            hash_display: hash_to_display_hex(&hash),
            midstate: hex::encode(header.midstate().to_bytes()),
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}

/// Midstate task for device drivers, hex encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub job_id: String,
    pub versions: Vec<u32>,
    pub midstates: Vec<String>,
    pub tail: String,
    pub ntime: u32,
    pub reversed: bool,
}

impl From<&MidstateTask> for TaskInfo {
    fn from(task: &MidstateTask) -> Self {
        TaskInfo {
            job_id: task.job_id.clone(),
            versions: task.versions.clone(),
            midstates: task.midstates.iter().map(hex::encode).collect(),
            tail: hex::encode(task.tail),
            ntime: task.ntime(),
            reversed: task.reversed,
        }
    }
}

impl TaskInfo {
    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}
