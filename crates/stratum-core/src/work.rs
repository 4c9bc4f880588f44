//! Work units: one job paired with one subscription, ready for a nonce search.
//!
//! Everything here is a pure function of its inputs. Many workers can share a
//! `Work` and explore disjoint extranonce2/nonce ranges without coordination;
//! deciding when a new job makes a search stale is the caller's business.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::block::{BlockHeader, HEADER_TAIL_SIZE};
use crate::coinbase::{CoinbaseBuilder, ExtraNonce2};
use crate::error::Result;
use crate::hash::double_sha256;
use crate::job::{StratumJob, Subscription};
use crate::merkle::merkle_root_from_hash;

/// A job bound to the session that received it.
#[derive(Debug, Clone)]
pub struct Work {
    subscription: Subscription,
    job: StratumJob,
}

impl Work {
    /// Pair a decoded job with the session data needed to build its coinbase.
    pub fn new(subscription: &Subscription, job: StratumJob) -> Self {
        debug!(
            job_id = %job.job_id,
            extranonce1 = %subscription.extranonce1.to_hex(),
            extranonce2_size = subscription.extranonce2_size,
            "New work"
        );

        Work {
            subscription: subscription.clone(),
            job,
        }
    }

    pub fn job(&self) -> &StratumJob {
        &self.job
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Serialized coinbase for one extranonce2.
    pub fn coinbase(&self, extranonce2: &ExtraNonce2) -> Result<Vec<u8>> {
        CoinbaseBuilder::new(
            &self.job.coinbase_part1,
            &self.job.coinbase_part2,
            &self.subscription.extranonce1,
        )
        .build(extranonce2)
    }

    /// Merkle root for one extranonce2.
    pub fn merkle_root(&self, extranonce2: &ExtraNonce2) -> Result<[u8; 32]> {
        let coinbase = self.coinbase(extranonce2)?;
        Ok(merkle_root_from_hash(
            double_sha256(&coinbase),
            &self.job.merkle_branches,
        ))
    }

    /// Header for one extranonce2 and nonce.
    pub fn header(&self, extranonce2: &ExtraNonce2, nonce: u32) -> Result<BlockHeader> {
        let merkle_root = self.merkle_root(extranonce2)?;
        let header = self.job.header(merkle_root).with_nonce(nonce);

        trace!(
            job_id = %self.job.job_id,
            extranonce2 = %extranonce2.to_hex(),
            nonce,
            "Built header"
        );

        Ok(header)
    }

    /// Double SHA256 of the header for one extranonce2 and nonce.
    pub fn header_hash(&self, extranonce2: &ExtraNonce2, nonce: u32) -> Result<[u8; 32]> {
        Ok(self.header(extranonce2, nonce)?.hash())
    }

    /// Hardware-ready task for one extranonce2, with one midstate per rolled version.
    pub fn midstate_task(
        &self,
        extranonce2: &ExtraNonce2,
        versions: &[u32],
    ) -> Result<MidstateTask> {
        let header = self.header(extranonce2, 0)?;
        Ok(MidstateTask::new(&self.job.job_id, &header, versions))
    }

    /// The tuple submitted back to the pool once a nonce is found.
    pub fn share(&self, extranonce2: &ExtraNonce2, nonce: u32) -> Share {
        Share {
            job_id: self.job.job_id.clone(),
            extranonce2: extranonce2.to_hex(),
            ntime: hex::encode(self.job.time),
            nonce: hex::encode(nonce.to_be_bytes()),
        }
    }
}

/// Midstates and header tail for one header, as consumed by hashing hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidstateTask {
    pub job_id: String,
    /// Versions the midstates were computed for, same order as `midstates`.
    pub versions: Vec<u32>,
    pub midstates: Vec<[u8; 32]>,
    /// Last 16 header bytes: merkle root tail, time, bits, nonce.
    pub tail: [u8; HEADER_TAIL_SIZE],
    /// Whether midstates and tail are byte-reversed.
    pub reversed: bool,
}

impl MidstateTask {
    /// Compute one midstate per version in `versions`.
    ///
    /// An empty list means no version rolling: a single midstate is computed
    /// for the header's own version.
    pub fn new(job_id: &str, header: &BlockHeader, versions: &[u32]) -> Self {
        let versions = if versions.is_empty() {
            alloc::vec![u32::from_be_bytes(header.version)]
        } else {
            versions.to_vec()
        };

        let midstates = versions
            .iter()
            .map(|version| header.with_version(*version).midstate().to_bytes())
            .collect();

        trace!(job_id, midstates = versions.len(), "Built midstate task");

        MidstateTask {
            job_id: String::from(job_id),
            versions,
            midstates,
            tail: header.tail(),
            reversed: false,
        }
    }

    /// Byte-reverse every midstate and the tail, for devices that take them reversed.
    pub fn reversed(mut self) -> Self {
        for midstate in self.midstates.iter_mut() {
            midstate.reverse();
        }
        self.tail.reverse();
        self.reversed = !self.reversed;
        self
    }

    /// The ntime carried in the tail.
    pub fn ntime(&self) -> u32 {
        let mut time = [0u8; 4];
        time.copy_from_slice(&self.tail[self.ntime_range()]);
        if self.reversed {
            u32::from_le_bytes(time)
        } else {
            u32::from_be_bytes(time)
        }
    }

    /// Roll ntime forward by `delta` seconds, wrapping on overflow.
    ///
    /// Time lives in the tail only, so the midstates stay valid.
    pub fn with_ntime_delta(mut self, delta: u32) -> Self {
        if delta == 0 {
            return self;
        }

        let time = self.ntime().wrapping_add(delta);
        let bytes = if self.reversed {
            time.to_le_bytes()
        } else {
            time.to_be_bytes()
        };
        let range = self.ntime_range();
        self.tail[range].copy_from_slice(&bytes);
        self
    }

    fn ntime_range(&self) -> Range<usize> {
        if self.reversed {
            8..12
        } else {
            4..8
        }
    }
}

/// Candidate versions for version rolling under a `mining.configure` mask.
///
/// The first entry is `version` itself. Bits outside `mask` are kept as they
/// are and the masked bits count up from zero, so the lowest mask bits roll
/// first. At most `max` versions are returned.
pub fn rolled_versions(version: u32, mask: u32, max: usize) -> Vec<u32> {
    let mut versions = Vec::new();
    if max == 0 {
        return versions;
    }
    versions.push(version);

    let positions: Vec<u32> = (0..32u32).filter(|bit| mask & (1 << *bit) != 0).collect();
    let base = version & !mask;

    for counter in 0..(1u64 << positions.len()) {
        if versions.len() >= max {
            break;
        }

        let rolled = positions
            .iter()
            .enumerate()
            .filter(|(i, _)| counter & (1u64 << *i) != 0)
            .fold(base, |acc, (_, bit)| acc | (1 << *bit));
        if rolled != version {
            versions.push(rolled);
        }
    }

    versions
}

/// The `(job_id, extranonce2, ntime, nonce)` tuple for `mining.submit`, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub job_id: String,
    pub extranonce2: String,
    pub ntime: String,
    pub nonce: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::header_hash;
    use crate::coinbase::DEFAULT_EXTRANONCE1_HEX_WIDTH;
    use crate::job::tests::{sample_params, SUBSCRIBE_RESULT};
    use crate::job::SubscribeResult;
    use crate::merkle::compute_merkle_root;
    use crate::midstate::Midstate;

    fn sample_work() -> Work {
        let result: SubscribeResult = serde_json::from_str(SUBSCRIBE_RESULT).unwrap();
        let subscription =
            Subscription::from_result(&result, DEFAULT_EXTRANONCE1_HEX_WIDTH).unwrap();
        let job = StratumJob::try_from(sample_params()).unwrap();
        Work::new(&subscription, job)
    }

    fn zero_extranonce2(work: &Work) -> ExtraNonce2 {
        work.subscription().extranonce2(0).unwrap()
    }

    #[test]
    fn test_fixture_coinbase() {
        let work = sample_work();
        let coinbase = work.coinbase(&zero_extranonce2(&work)).unwrap();
        let coinbase_hex = hex::encode(&coinbase);

        let expected = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4a031ccb0\
            9fabe6d6df183ff6cbf2a1e8198b6679b7cef3e1cce0431da353154caa55e04ca3f66b3a60100000000000000002a6502002aa65f000\
            0000000000000939d289b2f736c7573682f000000000443ca3c26000000001976a9147c154ed1dc59609e3d26abb2df2ea3d587cd8c4\
            188ac00000000000000002c6a4c2952534b424c4f434b3a0ec82b00b353ab052014b472cb3ee39bb32431be99b7db757171f71600275\
            0190000000000000000296a4c266a24b9e11b6d8f8cc50f47dc5e8537a9e300984ee50eefd8eb7917b4b83a28287fe15e80c98200000\
            00000000000266a24aa21a9ed7aee68d448839eba918f66147bf31b096fe443c60175a53878c8e052cdd799f700000000";
        assert_eq!(coinbase_hex, expected);

        assert_eq!(
            hex::encode(double_sha256(&coinbase)),
            "2d749fc9eeea345bd91241187f92318442f48fca3c2537c242d2c6c917d7dca6"
        );
    }

    #[test]
    fn test_fixture_merkle_root() {
        let work = sample_work();
        let root = work.merkle_root(&zero_extranonce2(&work)).unwrap();

        assert_eq!(
            hex::encode(root),
            "8de8f457cffef502d75ada232b2e68be61724c35f48432c7d0cac77d7b1dde50"
        );
    }

    #[test]
    fn test_fixture_header_and_hash() {
        let work = sample_work();
        let header = work.header(&zero_extranonce2(&work), 0).unwrap();

        assert_eq!(
            hex::encode(header.serialize()),
            "20000000bd3e4f2c6d8b14c9d677cb428a124dcae58c5530000f791f0000000000000000\
             8de8f457cffef502d75ada232b2e68be61724c35f48432c7d0cac77d7b1dde50\
             5f2606591710b4f800000000"
        );
        assert_eq!(
            hex::encode(header.hash()),
            "93ce397668878d409b5a3d3aaa9ad6b58442449c3c407969750d244137ce4abd"
        );
        assert_eq!(
            work.header_hash(&zero_extranonce2(&work), 0).unwrap(),
            header.hash()
        );

        // Hash over the 128-byte padded form fed to midstate-continuation devices.
        assert_eq!(
            hex::encode(double_sha256(&header.padded())),
            "c0554499cb6404341b6cec408e778ca5fc96c8c3612d5005edf699f4179d8392"
        );
    }

    #[test]
    fn test_fixture_padded_header() {
        let work = sample_work();
        let header = work.header(&zero_extranonce2(&work), 0).unwrap();

        assert_eq!(
            hex::encode(header.padded()),
            "20000000bd3e4f2c6d8b14c9d677cb428a124dcae58c5530000f791f00000000000000008de8f457cffef50\
             2d75ada232b2e68be61724c35f48432c7d0cac77d7b1dde505f2606591710b4f80000000000000080000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000080020000"
        );
    }

    #[test]
    fn test_fixture_midstate() {
        let work = sample_work();
        let header = work.header(&zero_extranonce2(&work), 0).unwrap();

        assert_eq!(
            hex::encode(header.midstate().to_bytes()),
            "2a1c47f3901269184e244be8cbf10a208b4d7ee62f8ebf02625b21f650733899"
        );
        assert_eq!(header.hash_from_midstate(&header.midstate()), header.hash());
    }

    #[test]
    fn test_extranonce2_changes_coinbase_hash() {
        let work = sample_work();
        let e2 = work.subscription().extranonce2(5).unwrap();
        let coinbase = work.coinbase(&e2).unwrap();

        assert_eq!(
            hex::encode(double_sha256(&coinbase)),
            "ca040b29d6e1e32df02bcb2b4664556867172b3a4330fef7fd1cd8067d4d13df"
        );
        assert_ne!(
            work.merkle_root(&e2).unwrap(),
            work.merkle_root(&zero_extranonce2(&work)).unwrap()
        );
    }

    #[test]
    fn test_nonce_only_changes_tail() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let header = work.header(&e2, 0xdeadbeef).unwrap();
        let serialized = header.serialize();

        assert_eq!(&serialized[76..], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            hex::encode(header_hash(&serialized)),
            "8bff79374375b4406493b169d36bf3462c675123dced200f680cdadb257cc674"
        );

        let base = work.header(&e2, 0).unwrap();
        assert_eq!(header.prefix(), base.prefix());
        assert_eq!(header.hash_from_midstate(&base.midstate()), header.hash());
    }

    #[test]
    fn test_reordered_branches_change_root() {
        let work = sample_work();
        let coinbase = work.coinbase(&zero_extranonce2(&work)).unwrap();

        let mut branches = work.job().merkle_branches.clone();
        branches.reverse();

        assert_eq!(
            hex::encode(compute_merkle_root(&coinbase, &branches)),
            "4ade797a388bd976e31de71cf46bc0c204e3bb9a310d728a8e35150ab0c2459a"
        );
    }

    #[test]
    fn test_header_is_deterministic() {
        let work = sample_work();
        let e2 = work.subscription().extranonce2(42).unwrap();

        assert_eq!(work.header(&e2, 7).unwrap(), work.header(&e2, 7).unwrap());
        assert_eq!(
            work.header(&e2, 7).unwrap().serialize(),
            sample_work().header(&e2, 7).unwrap().serialize()
        );
    }

    #[test]
    fn test_midstate_task_without_rolling() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let header = work.header(&e2, 0).unwrap();
        let task = work.midstate_task(&e2, &[]).unwrap();

        assert_eq!(task.job_id, "9b289d93");
        assert_eq!(task.versions, [0x20000000]);
        assert_eq!(task.midstates, [header.midstate().to_bytes()]);
        assert_eq!(task.tail, header.tail());
    }

    #[test]
    fn test_midstate_task_with_rolled_versions() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let task = work.midstate_task(&e2, &[0x20000000, 0x20002000]).unwrap();

        assert_eq!(task.midstates.len(), 2);
        assert_eq!(
            hex::encode(task.midstates[0]),
            "2a1c47f3901269184e244be8cbf10a208b4d7ee62f8ebf02625b21f650733899"
        );
        assert_eq!(
            hex::encode(task.midstates[1]),
            "08f391c6d3f1badc6c7e22384b88ea012407a1824adbef2fc2b38393742f58fb"
        );

        // A rolled midstate still finishes to the rolled header's hash.
        let rolled = work.header(&e2, 0).unwrap().with_version(0x20002000);
        let midstate = Midstate::from_bytes(&task.midstates[1]);
        assert_eq!(rolled.hash_from_midstate(&midstate), rolled.hash());
    }

    #[test]
    fn test_midstate_task_reversed() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let task = work.midstate_task(&e2, &[]).unwrap();
        let reversed = task.clone().reversed();

        let mut midstate = task.midstates[0];
        midstate.reverse();
        assert_eq!(reversed.midstates[0], midstate);
        assert_eq!(reversed.tail[0], task.tail[15]);
        assert_eq!(reversed.tail[15], task.tail[0]);
    }

    #[test]
    fn test_midstate_task_ntime_delta() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let header = work.header(&e2, 0).unwrap();
        let task = work.midstate_task(&e2, &[]).unwrap();
        assert_eq!(task.ntime(), 0x5f260659);

        let rolled = task.clone().with_ntime_delta(1);
        assert_eq!(rolled.ntime(), 0x5f26065a);
        assert_eq!(rolled.tail, header.with_time(0x5f26065a).tail());
        assert_eq!(rolled.midstates, task.midstates);

        assert_eq!(task.clone().with_ntime_delta(0), task);
        assert_eq!(task.clone().with_ntime_delta(u32::MAX).ntime(), 0x5f260658);
    }

    #[test]
    fn test_midstate_task_ntime_delta_reversed() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let task = work.midstate_task(&e2, &[]).unwrap();

        let reversed = task.clone().reversed();
        assert!(reversed.reversed);
        assert_eq!(reversed.ntime(), task.ntime());
        assert_eq!(
            reversed.with_ntime_delta(30),
            task.clone().with_ntime_delta(30).reversed()
        );
        assert_eq!(task.clone().reversed().reversed(), task);
    }

    #[test]
    fn test_rolled_versions() {
        assert_eq!(
            rolled_versions(0x20000000, 0x1fffe000, 4),
            [0x20000000, 0x20002000, 0x20004000, 0x20006000]
        );
        assert_eq!(rolled_versions(0x20000000, 0, 8), [0x20000000]);
        assert!(rolled_versions(0x20000000, 0x1fffe000, 0).is_empty());

        // Masked bits already set in the version still yield every combination once.
        let versions = rolled_versions(0x20002000, 0x00006000, 16);
        assert_eq!(versions, [0x20002000, 0x20000000, 0x20004000, 0x20006000]);
    }

    #[test]
    fn test_midstate_task_from_rolled_versions() {
        let work = sample_work();
        let e2 = zero_extranonce2(&work);
        let versions = rolled_versions(0x20000000, 0x1fffe000, 2);
        let task = work.midstate_task(&e2, &versions).unwrap();

        assert_eq!(task.versions, [0x20000000, 0x20002000]);
        assert_eq!(
            hex::encode(task.midstates[1]),
            "08f391c6d3f1badc6c7e22384b88ea012407a1824adbef2fc2b38393742f58fb"
        );
    }

    #[test]
    fn test_share() {
        let work = sample_work();
        let e2 = work.subscription().extranonce2(4).unwrap();
        let share = work.share(&e2, 0x0102abcd);

        assert_eq!(
            share,
            Share {
                job_id: "9b289d93".into(),
                extranonce2: "0400000000000000".into(),
                ntime: "5f260659".into(),
                nonce: "0102abcd".into(),
            }
        );
    }
}
