//! Core Stratum work processing.
//!
//! This crate turns the decoded parameters of `mining.subscribe` and
//! `mining.notify` into hashable work:
//! - Coinbase assembly from pool fragments and extranonces
//! - Merkle root reduction over the pool's merkle branch
//! - Block header assembly and double-SHA256 header hashing
//! - SHA256 midstate precomputation for nonce search
//!
//! Connection handling, JSON-RPC framing and share validation live elsewhere.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod block;
pub mod coinbase;
pub mod error;
pub mod hash;
pub mod job;
pub mod merkle;
pub mod midstate;
pub mod work;

pub use block::{assemble_header, header_for_midstate, header_hash, BlockHeader};
pub use coinbase::{build_coinbase, CoinbaseBuilder, ExtraNonce1, ExtraNonce2};
pub use error::{Result, WorkError};
pub use hash::double_sha256;
pub use job::{NotifyParams, StratumJob, SubscribeResult, Subscription};
pub use merkle::compute_merkle_root;
pub use midstate::{compute_midstate, continuation_padding, Midstate};
pub use work::{rolled_versions, MidstateTask, Share, Work};
