// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Measurement and projection kernels (K_M): probability of a computational
//! basis outcome, and collapse onto a known outcome.

use rayon::prelude::*;

use crate::index_algebra::{block_sizes, extract_bit};
use crate::register::Qureg;

/// Sum of `|amp|^2` over the amplitudes in this chunk whose `measure_qubit`
/// bit is 0, for a pure state whose chunk fully contains both halves of
/// every block.
pub fn find_probability_of_zero_local(qureg: &Qureg, measure_qubit: u32) -> f64 {
    let (size_half_block, size_block) = block_sizes(measure_qubit);
    let num_tasks = qureg.num_amps_per_chunk as u64 / 2;
    let sv = qureg.state_vec();
    (0..num_tasks)
        .into_par_iter()
        .map(|task| {
            let this_block = task / size_half_block;
            let index = (this_block * size_block + task % size_half_block) as usize;
            sv.real[index] * sv.real[index] + sv.imag[index] * sv.imag[index]
        })
        .sum()
}

/// Sum of `|amp|^2` over every amplitude in this chunk, for a pure state
/// whose chunk lies entirely within one measurement half (the caller has
/// already determined which half this chunk represents).
pub fn find_probability_of_zero_distributed(qureg: &Qureg) -> f64 {
    let sv = qureg.state_vec();
    sv.real
        .par_iter()
        .zip(&sv.imag)
        .map(|(re, im)| re * re + im * im)
        .sum()
}

/// Renormalizes or zeroes this chunk's amplitudes to realize a known
/// measurement outcome, local variant: both halves of every block live in
/// this chunk.
pub fn collapse_to_known_prob_outcome_local(qureg: &mut Qureg, measure_qubit: u32, outcome: u8, total_state_prob: f64) {
    let (size_half_block, size_block) = block_sizes(measure_qubit);
    let renorm = 1.0 / total_state_prob.sqrt();
    let num_tasks = qureg.num_amps_per_chunk as u64 / 2;
    let state_vec = qureg.state_vec_mut();

    for task in 0..num_tasks {
        let this_block = task / size_half_block;
        let index_up = (this_block * size_block + task % size_half_block) as usize;
        let index_lo = index_up + size_half_block as usize;
        if outcome == 0 {
            state_vec.real[index_up] *= renorm;
            state_vec.imag[index_up] *= renorm;
            state_vec.real[index_lo] = 0.0;
            state_vec.imag[index_lo] = 0.0;
        } else {
            state_vec.real[index_lo] *= renorm;
            state_vec.imag[index_lo] *= renorm;
            state_vec.real[index_up] = 0.0;
            state_vec.imag[index_up] = 0.0;
        }
    }
}

/// Renormalizes every amplitude in this chunk by `1/sqrt(total_state_prob)`
/// (the chunk is entirely the desired outcome's half).
pub fn collapse_to_known_prob_outcome_distributed_renorm(qureg: &mut Qureg, total_state_prob: f64) {
    let renorm = 1.0 / total_state_prob.sqrt();
    let state_vec = qureg.state_vec_mut();
    state_vec.real.par_iter_mut().for_each(|r| *r *= renorm);
    state_vec.imag.par_iter_mut().for_each(|i| *i *= renorm);
}

/// Zeroes every amplitude in this chunk (the chunk is entirely the
/// undesired outcome's half).
pub fn collapse_to_outcome_distributed_set_zero(qureg: &mut Qureg) {
    let state_vec = qureg.state_vec_mut();
    state_vec.real.fill(0.0);
    state_vec.imag.fill(0.0);
}

fn zero_some_amps(qureg: &mut Qureg, start_ind: usize, num_amps: usize) {
    let sv = qureg.state_vec_mut();
    sv.real[start_ind..start_ind + num_amps].fill(0.0);
    sv.imag[start_ind..start_ind + num_amps].fill(0.0);
}

fn normalise_some_amps(qureg: &mut Qureg, total_state_prob: f64, start_ind: usize, num_amps: usize) {
    let renorm = 1.0 / total_state_prob.sqrt();
    let sv = qureg.state_vec_mut();
    sv.real[start_ind..start_ind + num_amps].iter_mut().for_each(|r| *r *= renorm);
    sv.imag[start_ind..start_ind + num_amps].iter_mut().for_each(|i| *i *= renorm);
}

fn alternate_norm_zeroing_some_amp_blocks(
    qureg: &mut Qureg,
    total_state_prob: f64,
    normalise_inner_block: bool,
    start_ind: usize,
    num_amps: usize,
    inner_block_size: usize,
) {
    let mut block_start = start_ind;
    let end = start_ind + num_amps;
    let mut normalise_this = normalise_inner_block;
    while block_start < end {
        if normalise_this {
            normalise_some_amps(qureg, total_state_prob, block_start, inner_block_size);
        } else {
            zero_some_amps(qureg, block_start, inner_block_size);
        }
        normalise_this = !normalise_this;
        block_start += inner_block_size;
    }
}

/// Collapses a density matrix onto a known measurement outcome on
/// `measure_qubit`, handling the three chunk/block-overlap shortcuts
/// (entire chunk is one outer block; entire chunk is one inner block;
/// general case walking inner blocks within alternating outer double-blocks)
/// exactly as `densmatr_collapseToKnownProbOutcome`.
pub fn collapse_to_known_prob_outcome_density(
    qureg: &mut Qureg,
    measure_qubit: u32,
    outcome: u8,
    total_state_prob: f64,
) {
    let n = qureg.num_qubits_represented;
    let inner_block_size = (1u64 << measure_qubit) as usize;
    let outer_block_size = (1u64 << (measure_qubit + n)) as usize;
    let loc_num_amps = qureg.num_amps_per_chunk;
    let global_start_ind = qureg.global_index(0);
    let inner_bit = extract_bit(measure_qubit, global_start_ind);
    let outer_bit = extract_bit(measure_qubit + n, global_start_ind);

    if loc_num_amps <= outer_block_size {
        if outer_bit != outcome {
            zero_some_amps(qureg, 0, loc_num_amps);
            return;
        }
        if loc_num_amps <= inner_block_size {
            if inner_bit != outcome {
                zero_some_amps(qureg, 0, loc_num_amps);
            } else {
                normalise_some_amps(qureg, total_state_prob, 0, loc_num_amps);
            }
            return;
        }
        alternate_norm_zeroing_some_amp_blocks(
            qureg,
            total_state_prob,
            inner_bit == outcome,
            0,
            loc_num_amps,
            inner_block_size,
        );
        return;
    }

    let num_outer_double_blocks = loc_num_amps / (2 * outer_block_size);
    if outer_bit == outcome {
        for outer_dub_block_ind in 0..num_outer_double_blocks {
            let first_block_ind = outer_dub_block_ind * 2 * outer_block_size;
            alternate_norm_zeroing_some_amp_blocks(
                qureg,
                total_state_prob,
                inner_bit == outcome,
                first_block_ind,
                outer_block_size,
                inner_block_size,
            );
            zero_some_amps(qureg, first_block_ind + outer_block_size, outer_block_size);
        }
    } else {
        for outer_dub_block_ind in 0..num_outer_double_blocks {
            let first_block_ind = outer_dub_block_ind * 2 * outer_block_size;
            zero_some_amps(qureg, first_block_ind, outer_block_size);
            alternate_norm_zeroing_some_amp_blocks(
                qureg,
                total_state_prob,
                inner_bit == outcome,
                first_block_ind + outer_block_size,
                outer_block_size,
                inner_block_size,
            );
        }
    }
}
