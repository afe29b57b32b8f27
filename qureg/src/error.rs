// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Fatal failures reported by register creation.
///
/// Precondition violations by the gate-composition layer (mismatched
/// chunking, out-of-range qubit indices) are not represented here: the
/// contract in spec.md §7 treats those as composer bugs, asserted away in
/// debug builds rather than recovered from at runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuregError {
    #[error(
        "requested amplitude count {requested} per chunk exceeds this platform's addressable range"
    )]
    ResourceExhausted { requested: u128 },

    #[error("numChunks must be a power of two, got {0}")]
    ChunkCountNotPowerOfTwo(usize),

    #[error(
        "numAmpsTotal ({num_amps_total}) is not evenly divisible by numChunks ({num_chunks})"
    )]
    UnevenChunking {
        num_amps_total: u64,
        num_chunks: usize,
    },
}
