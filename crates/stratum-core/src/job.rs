//! Decoded Stratum messages: session subscription and `mining.notify` jobs.
//!
//! JSON-RPC framing is handled by the transport. These types start from the
//! `result` of `mining.subscribe` and the `params` of `mining.notify` and turn
//! their hex strings into fixed-width bytes, without touching byte order.

use alloc::string::String;
use alloc::vec::Vec;

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::BlockHeader;
use crate::coinbase::{ExtraNonce1, ExtraNonce2};
use crate::error::{decode_hex, fixed, Result, WorkError};

/// The `params` array of a `mining.notify` message, still hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyParams {
    pub job_id: String,
    pub prevhash: String,
    pub coinb1: String,
    pub coinb2: String,
    pub merkle_branches: Vec<String>,
    pub version: String,
    pub nbits: String,
    pub ntime: String,
    pub clean_jobs: bool,
}

impl Serialize for NotifyParams {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(9))?;
        seq.serialize_element(&self.job_id)?;
        seq.serialize_element(&self.prevhash)?;
        seq.serialize_element(&self.coinb1)?;
        seq.serialize_element(&self.coinb2)?;
        seq.serialize_element(&self.merkle_branches)?;
        seq.serialize_element(&self.version)?;
        seq.serialize_element(&self.nbits)?;
        seq.serialize_element(&self.ntime)?;
        seq.serialize_element(&self.clean_jobs)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for NotifyParams {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (job_id, prevhash, coinb1, coinb2, merkle_branches, version, nbits, ntime, clean_jobs) =
            <(
                String,
                String,
                String,
                String,
                Vec<String>,
                String,
                String,
                String,
                bool,
            )>::deserialize(deserializer)?;

        Ok(NotifyParams {
            job_id,
            prevhash,
            coinb1,
            coinb2,
            merkle_branches,
            version,
            nbits,
            ntime,
            clean_jobs,
        })
    }
}

/// The `result` of `mining.subscribe`: subscriptions, extranonce1 and extranonce2 size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeResult {
    pub subscriptions: Vec<Vec<String>>,
    pub extranonce1: String,
    pub extranonce2_size: usize,
}

impl Serialize for SubscribeResult {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.subscriptions)?;
        seq.serialize_element(&self.extranonce1)?;
        seq.serialize_element(&self.extranonce2_size)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SubscribeResult {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (subscriptions, extranonce1, extranonce2_size) =
            <(Vec<Vec<String>>, String, usize)>::deserialize(deserializer)?;

        Ok(SubscribeResult {
            subscriptions,
            extranonce1,
            extranonce2_size,
        })
    }
}

/// Per-connection session data handed out by the pool at subscribe time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub extranonce1: ExtraNonce1,
    pub extranonce2_size: usize,
}

impl Subscription {
    /// Create a subscription, padding extranonce1 to `extranonce1_width` hex characters.
    pub fn new(
        extranonce1_hex: &str,
        extranonce1_width: usize,
        extranonce2_size: usize,
    ) -> Result<Self> {
        Ok(Subscription {
            extranonce1: ExtraNonce1::from_hex(extranonce1_hex, extranonce1_width)?,
            extranonce2_size,
        })
    }

    /// Build a subscription from a decoded `mining.subscribe` result.
    pub fn from_result(result: &SubscribeResult, extranonce1_width: usize) -> Result<Self> {
        Subscription::new(&result.extranonce1, extranonce1_width, result.extranonce2_size)
    }

    /// Lay out an extranonce2 counter at the width this session declared.
    pub fn extranonce2(&self, counter: u64) -> Result<ExtraNonce2> {
        ExtraNonce2::new(counter, self.extranonce2_size)
    }
}

/// One unit of mining work from `mining.notify`, decoded to raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratumJob {
    pub job_id: String,
    pub previous_block_hash: [u8; 32],
    pub coinbase_part1: Vec<u8>,
    pub coinbase_part2: Vec<u8>,
    /// Applied leftmost first.
    pub merkle_branches: Vec<[u8; 32]>,
    pub version: [u8; 4],
    pub bits: [u8; 4],
    pub time: [u8; 4],
    pub clean_jobs: bool,
}

impl StratumJob {
    /// Header for this job with the given merkle root and a zero nonce.
    pub fn header(&self, merkle_root: [u8; 32]) -> BlockHeader {
        BlockHeader::new(
            self.version,
            self.previous_block_hash,
            merkle_root,
            self.time,
            self.bits,
        )
    }
}

impl TryFrom<&NotifyParams> for StratumJob {
    type Error = WorkError;

    fn try_from(params: &NotifyParams) -> Result<Self> {
        let coinbase_part1 = decode_hex("coinb1", &params.coinb1)?;
        if coinbase_part1.is_empty() {
            return Err(WorkError::EmptyRequiredField { field: "coinb1" });
        }
        let coinbase_part2 = decode_hex("coinb2", &params.coinb2)?;
        if coinbase_part2.is_empty() {
            return Err(WorkError::EmptyRequiredField { field: "coinb2" });
        }

        let merkle_branches = params
            .merkle_branches
            .iter()
            .map(|branch| fixed("merkle branch", &decode_hex("merkle branch", branch)?))
            .collect::<Result<Vec<[u8; 32]>>>()?;

        let job = StratumJob {
            job_id: params.job_id.clone(),
            previous_block_hash: fixed("prevhash", &decode_hex("prevhash", &params.prevhash)?)?,
            coinbase_part1,
            coinbase_part2,
            merkle_branches,
            version: fixed("version", &decode_hex("version", &params.version)?)?,
            bits: fixed("nbits", &decode_hex("nbits", &params.nbits)?)?,
            time: fixed("ntime", &decode_hex("ntime", &params.ntime)?)?,
            clean_jobs: params.clean_jobs,
        };

        debug!(
            job_id = %job.job_id,
            branches = job.merkle_branches.len(),
            clean_jobs = job.clean_jobs,
            "Decoded notify"
        );

        Ok(job)
    }
}

impl TryFrom<NotifyParams> for StratumJob {
    type Error = WorkError;

    fn try_from(params: NotifyParams) -> Result<Self> {
        StratumJob::try_from(&params)
    }
}
