// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Pure index arithmetic shared by every kernel.
//!
//! None of these functions touch amplitude storage; they map a task ordinal
//! and a set of qubit positions to the basis-state indices a kernel must
//! read and write. Kept free of `Qureg` so they can be unit tested in
//! isolation from register allocation.

/// Bit `k` of `x`, as 0 or 1.
#[inline]
#[must_use]
pub const fn extract_bit(target_qubit: u32, index: u64) -> u8 {
    ((index >> target_qubit) & 1) as u8
}

/// `x` with bit `k` toggled.
#[inline]
#[must_use]
pub const fn flip_bit(index: u64, target_qubit: u32) -> u64 {
    index ^ (1u64 << target_qubit)
}

/// Splits `x` at bit `k`, shifts the high part up by one, and inserts a zero
/// at position `k`. Used to enumerate the basis states with target-bit = 0.
#[inline]
#[must_use]
pub const fn insert_zero_bit(index: u64, k: u32) -> u64 {
    let low = index & ((1u64 << k) - 1);
    let high = (index >> k) << (k + 1);
    high | low
}

/// Applies [`insert_zero_bit`] twice, smaller qubit index first. `q1` and
/// `q2` must differ.
#[inline]
#[must_use]
pub fn insert_two_zero_bits(index: u64, q1: u32, q2: u32) -> u64 {
    let (small, big) = if q1 < q2 { (q1, q2) } else { (q2, q1) };
    insert_zero_bit(insert_zero_bit(index, small), big)
}

/// Applies [`insert_zero_bit`] once per entry of `sorted_targets`, which must
/// already be in ascending order.
#[inline]
#[must_use]
pub fn insert_zero_bits(index: u64, sorted_targets: &[u32]) -> u64 {
    let mut out = index;
    for &q in sorted_targets {
        out = insert_zero_bit(out, q);
    }
    out
}

/// OR of `1 << t` over every qubit in `targets`.
#[inline]
#[must_use]
pub fn get_qubit_bit_mask(targets: &[u32]) -> u64 {
    targets.iter().fold(0u64, |mask, &t| mask | (1u64 << t))
}

/// Parity (0 or 1) of the population count of `mask`.
#[inline]
#[must_use]
pub const fn get_bit_mask_parity(mask: u64) -> u8 {
    (mask.count_ones() & 1) as u8
}

/// Block/half-block decomposition for a single target qubit: the size of a
/// half-block and of a full block.
#[inline]
#[must_use]
pub const fn block_sizes(target_qubit: u32) -> (u64, u64) {
    let size_half_block = 1u64 << target_qubit;
    (size_half_block, 2 * size_half_block)
}

/// Expands task ordinal `task` (0 ≤ task < total/2) into the pair of indices
/// a single-qubit kernel must read: `index_up` and `index_lo = index_up +
/// size_half_block`.
#[inline]
#[must_use]
pub const fn expand_task_to_up_lo(task: u64, target_qubit: u32) -> (u64, u64) {
    let (size_half_block, size_block) = block_sizes(target_qubit);
    let this_block = task / size_half_block;
    let index_up = this_block * size_block + task % size_half_block;
    (index_up, index_up + size_half_block)
}
