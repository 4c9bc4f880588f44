//! Work controller exposed to JavaScript.

use stratum_core::coinbase::DEFAULT_EXTRANONCE1_HEX_WIDTH;
use stratum_core::{ExtraNonce2, NotifyParams, StratumJob, Subscription, Work, WorkError};
use wasm_bindgen::prelude::*;

use crate::state::{HeaderInfo, JobInfo, TaskInfo};

/// Turns pool jobs into headers and midstates for one session.
#[wasm_bindgen]
pub struct Worker {
    /// Session data from `mining.subscribe`.
    subscription: Subscription,
    /// The job currently being worked on.
    work: Option<Work>,
}

#[wasm_bindgen]
impl Worker {
    /// Create a worker for a subscribed session.
    ///
    /// # Arguments
    /// * `extranonce1` - Hex extranonce1 from the subscribe result
    /// * `extranonce2_size` - extranonce2 size in bytes from the subscribe result
    #[wasm_bindgen(constructor)]
    pub fn new(extranonce1: &str, extranonce2_size: usize) -> Result<Worker, JsValue> {
        Worker::with_extranonce1_width(extranonce1, DEFAULT_EXTRANONCE1_HEX_WIDTH, extranonce2_size)
    }

    /// Create a worker with an explicit extranonce1 pad width in hex characters.
    #[wasm_bindgen]
    pub fn with_extranonce1_width(
        extranonce1: &str,
        extranonce1_width: usize,
        extranonce2_size: usize,
    ) -> Result<Worker, JsValue> {
        let subscription = Subscription::new(extranonce1, extranonce1_width, extranonce2_size)
            .map_err(to_js_error)?;

        Ok(Worker {
            subscription,
            work: None,
        })
    }

    /// Load a job from `mining.notify` params given as a JS array.
    #[wasm_bindgen]
    pub fn set_job(&mut self, params: JsValue) -> Result<JsValue, JsValue> {
        let params: NotifyParams = serde_wasm_bindgen::from_value(params)
            .map_err(|e| JsValue::from_str(&format!("Invalid notify params: {:?}", e)))?;
        self.load(params)
    }

    /// Load a job from `mining.notify` params given as a JSON string.
    #[wasm_bindgen]
    pub fn set_job_json(&mut self, params: &str) -> Result<JsValue, JsValue> {
        let params: NotifyParams = serde_json::from_str(params)
            .map_err(|e| JsValue::from_str(&format!("Invalid notify params: {}", e)))?;
        self.load(params)
    }

    /// Drop the current job, e.g. after a clean_jobs notify from another source.
    #[wasm_bindgen]
    pub fn clear_job(&mut self) {
        self.work = None;
    }

    /// Whether a job is loaded.
    #[wasm_bindgen(getter)]
    pub fn has_job(&self) -> bool {
        self.work.is_some()
    }

    /// Serialized 80-byte header, hex.
    #[wasm_bindgen]
    pub fn header_hex(&self, extranonce2: u64, nonce: u32) -> Result<String, JsValue> {
        let (work, extranonce2) = self.attempt(extranonce2)?;
        let header = work.header(&extranonce2, nonce).map_err(to_js_error)?;
        Ok(hex::encode(header.serialize()))
    }

    /// Double SHA256 of the header, hex in internal byte order.
    #[wasm_bindgen]
    pub fn header_hash_hex(&self, extranonce2: u64, nonce: u32) -> Result<String, JsValue> {
        let (work, extranonce2) = self.attempt(extranonce2)?;
        let hash = work.header_hash(&extranonce2, nonce).map_err(to_js_error)?;
        Ok(hex::encode(hash))
    }

    /// Header, hash and midstate for one attempt.
    #[wasm_bindgen]
    pub fn header_info(&self, extranonce2: u64, nonce: u32) -> Result<JsValue, JsValue> {
        let (work, extranonce2) = self.attempt(extranonce2)?;
        let header = work.header(&extranonce2, nonce).map_err(to_js_error)?;
        HeaderInfo::new(&header).to_js()
    }

    /// Midstate of the header's first block, hex. Independent of the nonce.
    #[wasm_bindgen]
    pub fn midstate_hex(&self, extranonce2: u64) -> Result<String, JsValue> {
        let (work, extranonce2) = self.attempt(extranonce2)?;
        let header = work.header(&extranonce2, 0).map_err(to_js_error)?;
        Ok(hex::encode(header.midstate().to_bytes()))
    }

    /// Midstates for a set of rolled versions plus the header tail.
    #[wasm_bindgen]
    pub fn midstate_task(&self, extranonce2: u64, versions: Vec<u32>) -> Result<JsValue, JsValue> {
        let (work, extranonce2) = self.attempt(extranonce2)?;
        let task = work.midstate_task(&extranonce2, &versions).map_err(to_js_error)?;
        TaskInfo::from(&task).to_js()
    }

    /// Rolled versions of the loaded job's version under a `mining.configure` mask.
    #[wasm_bindgen]
    pub fn rolled_versions(&self, mask: u32, max: usize) -> Result<Vec<u32>, JsValue> {
        let work = self.current()?;
        let version = u32::from_be_bytes(work.job().version);
        Ok(stratum_core::rolled_versions(version, mask, max))
    }

    /// Submission tuple for a found nonce.
    #[wasm_bindgen]
    pub fn share(&self, extranonce2: u64, nonce: u32) -> Result<JsValue, JsValue> {
        let (work, extranonce2) = self.attempt(extranonce2)?;
        serde_wasm_bindgen::to_value(&work.share(&extranonce2, nonce))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }

    /// Summary of the loaded job.
    #[wasm_bindgen]
    pub fn job_info(&self) -> Result<JsValue, JsValue> {
        let work = self.current()?;
        JobInfo::new(work.job(), &self.subscription).to_js()
    }
}

impl Worker {
    fn load(&mut self, params: NotifyParams) -> Result<JsValue, JsValue> {
        let job = StratumJob::try_from(params).map_err(to_js_error)?;
        let info = JobInfo::new(&job, &self.subscription);

        console_log(&format!(
            "Job {} loaded ({} merkle branches, clean_jobs={})",
            info.job_id, info.merkle_branches, info.clean_jobs
        ));

        self.work = Some(Work::new(&self.subscription, job));
        info.to_js()
    }

    fn current(&self) -> Result<&Work, JsValue> {
        self.work
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No job loaded"))
    }

    fn attempt(&self, extranonce2: u64) -> Result<(&Work, ExtraNonce2), JsValue> {
        let work = self.current()?;
        let extranonce2 = self
            .subscription
            .extranonce2(extranonce2)
            .map_err(to_js_error)?;
        Ok((work, extranonce2))
    }
}

fn to_js_error(error: WorkError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
