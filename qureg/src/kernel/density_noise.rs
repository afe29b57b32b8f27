// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Density-matrix noise channels (K_D): dephasing, amplitude damping,
//! depolarising, and density-matrix mixing. All operate on a `Qureg` created
//! with [`Qureg::create_density`](crate::register::Qureg::create_density).

use rayon::prelude::*;

use crate::index_algebra::extract_bit;
use crate::register::Qureg;

/// Scales every off-diagonal amplitude touching `target_qubit`'s row/column
/// split by `retain = 1 - dephase`. Shared by plain dephasing and the
/// dephasing half of amplitude damping (`damping_dephase` passes
/// `sqrt(1-damping)` as `retain` instead of `1-dephase`).
fn scale_off_diagonal_single(qureg: &mut Qureg, target_qubit: u32, retain: f64) {
    let n = qureg.num_qubits_represented;
    let inner_mask = 1u64 << target_qubit;
    let outer_mask = 1u64 << (target_qubit + n);
    let tot_mask = inner_mask | outer_mask;
    let chunk_offset = qureg.global_index(0);
    let state_vec = qureg.state_vec_mut();
    state_vec
        .real
        .par_iter_mut()
        .zip(state_vec.imag.par_iter_mut())
        .enumerate()
        .for_each(|(i, (re, im))| {
            let pattern = (chunk_offset + i as u64) & tot_mask;
            if pattern == inner_mask || pattern == outer_mask {
                *re *= retain;
                *im *= retain;
            }
        });
}

/// Single-qubit dephasing channel: `rho -> (1-dephase)*rho` on the
/// off-diagonal blocks of `target_qubit`, identity on the diagonal.
pub fn mix_dephasing(qureg: &mut Qureg, target_qubit: u32, dephase: f64) {
    scale_off_diagonal_single(qureg, target_qubit, 1.0 - dephase);
}

/// The dephasing component of single-qubit amplitude damping: `retain =
/// sqrt(1 - damping)`.
pub fn mix_damping_dephase(qureg: &mut Qureg, target_qubit: u32, damping: f64) {
    scale_off_diagonal_single(qureg, target_qubit, (1.0 - damping).sqrt());
}

/// Two-qubit dephasing: scales by `1-dephase` wherever either qubit's
/// inner/outer pattern mismatches (row bit != column bit for that qubit).
pub fn mix_two_qubit_dephasing(qureg: &mut Qureg, qubit1: u32, qubit2: u32, dephase: f64) {
    let n = qureg.num_qubits_represented;
    let tot_mask1 = (1u64 << qubit1) | (1u64 << (qubit1 + n));
    let tot_mask2 = (1u64 << qubit2) | (1u64 << (qubit2 + n));
    let retain = 1.0 - dephase;
    let chunk_offset = qureg.global_index(0);
    let state_vec = qureg.state_vec_mut();
    state_vec
        .real
        .par_iter_mut()
        .zip(state_vec.imag.par_iter_mut())
        .enumerate()
        .for_each(|(i, (re, im))| {
            let g = chunk_offset + i as u64;
            let p1 = g & tot_mask1;
            let mismatch1 = p1 != 0 && p1 != tot_mask1;
            let p2 = g & tot_mask2;
            let mismatch2 = p2 != 0 && p2 != tot_mask2;
            if mismatch1 || mismatch2 {
                *re *= retain;
                *im *= retain;
            }
        });
}

/// Single-qubit depolarising channel, whole chunk contains both `target_qubit`
/// row/column partners (`totMask` fits inside one chunk).
pub fn mix_depolarising_local(qureg: &mut Qureg, target_qubit: u32, depol_level: f64) {
    let n = qureg.num_qubits_represented;
    let tot_mask = (1u64 << target_qubit) | (1u64 << (target_qubit + n));
    let retain = 1.0 - depol_level;
    let chunk_offset = qureg.global_index(0);
    let num_amps = qureg.num_amps_per_chunk;
    let state_vec = qureg.state_vec_mut();

    for this_task in 0..num_amps {
        let global = chunk_offset + this_task as u64;
        let pattern = global & tot_mask;
        if pattern != 0 && pattern != tot_mask {
            // off-diagonal: scale towards zero
            state_vec.real[this_task] *= retain;
            state_vec.imag[this_task] *= retain;
            continue;
        }
        // on-diagonal: only process the |...0...><...0...| member of the
        // pair to avoid double-processing; its |1><1| partner is `partner`.
        if global & tot_mask == tot_mask {
            continue;
        }
        let partner = this_task | tot_mask as usize;
        let real_av = 0.5 * (state_vec.real[this_task] + state_vec.real[partner]);
        let imag_av = 0.5 * (state_vec.imag[this_task] + state_vec.imag[partner]);
        let (self_re, self_im) = (state_vec.real[this_task], state_vec.imag[this_task]);
        let (partner_re, partner_im) = (state_vec.real[partner], state_vec.imag[partner]);
        state_vec.real[this_task] = retain * self_re + depol_level * real_av;
        state_vec.imag[this_task] = retain * self_im + depol_level * imag_av;
        state_vec.real[partner] = retain * partner_re + depol_level * real_av;
        state_vec.imag[partner] = retain * partner_im + depol_level * imag_av;
    }
}

/// Single-qubit amplitude damping channel, whole chunk contains both
/// `target_qubit` row/column partners.
pub fn mix_damping_local(qureg: &mut Qureg, target_qubit: u32, damping: f64) {
    let n = qureg.num_qubits_represented;
    let tot_mask = (1u64 << target_qubit) | (1u64 << (target_qubit + n));
    let dephase = (1.0 - damping).sqrt();
    let retain = 1.0 - damping;
    let chunk_offset = qureg.global_index(0);
    let num_amps = qureg.num_amps_per_chunk;
    let state_vec = qureg.state_vec_mut();

    for this_task in 0..num_amps {
        let global = chunk_offset + this_task as u64;
        let pattern = global & tot_mask;
        if pattern != 0 && pattern != tot_mask {
            state_vec.real[this_task] *= dephase;
            state_vec.imag[this_task] *= dephase;
            continue;
        }
        if pattern == tot_mask {
            continue; // the |1><1| bucket is handled as `partner` below
        }
        let partner = this_task | tot_mask as usize;
        let (partner_re, partner_im) = (state_vec.real[partner], state_vec.imag[partner]);
        state_vec.real[this_task] += damping * partner_re;
        state_vec.imag[this_task] += damping * partner_im;
        state_vec.real[partner] *= retain;
        state_vec.imag[partner] *= retain;
    }
}

/// Distributed half of single-qubit depolarising: the dephasing step runs
/// locally on the whole chunk, then the on-diagonal half is combined with
/// `pair_state_vec` (pre-filled by the transport with the matching
/// row/column-swapped amplitudes).
pub fn mix_depolarising_distributed(qureg: &mut Qureg, target_qubit: u32, depol_level: f64) {
    mix_dephasing(qureg, target_qubit, depol_level);
    mix_on_diagonal_depolarising_distributed(qureg, target_qubit, depol_level);
}

/// Distributed half of single-qubit amplitude damping.
pub fn mix_damping_distributed(qureg: &mut Qureg, target_qubit: u32, damping: f64) {
    mix_damping_dephase(qureg, target_qubit, damping);
    mix_on_diagonal_damping_distributed(qureg, target_qubit, damping);
}

/// Locates the on-diagonal amplitude this chunk locally holds for task
/// `this_task`, and the bit (0 or 1) of `target_qubit`'s column component
/// that selects which of the two on-diagonal buckets (`|0><0|` or `|1><1|`)
/// it is — matching `densmatr_mixDepolarisingDistributed`'s/
/// `densmatr_mixDampingDistributed`'s shared index derivation
/// (`thisOuterColumn`/`thisInnerBlock`/`thisIndexInInnerBlock`, divided by
/// `sizeOuterHalfColumn`, not the full outer column).
fn on_diagonal_index_and_bucket(qureg: &Qureg, target_qubit: u32, this_task: u64) -> (usize, u64) {
    let n = qureg.num_qubits_represented;
    let size_inner_half_block = 1u64 << target_qubit;
    let size_inner_block = 2 * size_inner_half_block;
    let size_outer_column = 1u64 << n;
    let size_outer_half_column = size_outer_column >> 1;
    let chunk_offset = qureg.global_index(0);

    let this_outer_column = this_task / size_outer_half_column;
    let this_index_in_outer_column = this_task % size_outer_half_column;
    let this_inner_block = this_index_in_outer_column / size_inner_half_block;
    let this_index_in_inner_block = this_task % size_inner_half_block;
    let mut this_index =
        this_outer_column * size_outer_column + this_inner_block * size_inner_block + this_index_in_inner_block;

    let outer_bit = extract_bit(target_qubit, (chunk_offset + this_index) >> n) as u64;
    this_index += outer_bit * size_inner_half_block;

    (this_index as usize, outer_bit)
}

/// On-diagonal half of distributed single-qubit depolarising: every bucket
/// (whichever of `|0><0|`/`|1><1|` this chunk locally holds) is replaced by
/// `(1-depolLevel)*self + depolLevel*(self+pair)/2`, matching
/// `densmatr_mixDepolarisingDistributed`'s uniform average.
fn mix_on_diagonal_depolarising_distributed(qureg: &mut Qureg, target_qubit: u32, depol_level: f64) {
    let num_tasks = qureg.num_amps_per_chunk as u64 >> 1;
    let retain = 1.0 - depol_level;
    let pair = qureg
        .pair_state_vec()
        .expect("distributed noise channel requires a populated pair buffer")
        .clone();

    for this_task in 0..num_tasks {
        let (idx, _) = on_diagonal_index_and_bucket(qureg, target_qubit, this_task);
        let task = this_task as usize;
        let state_vec = qureg.state_vec_mut();
        let (self_re, self_im) = (state_vec.real[idx], state_vec.imag[idx]);
        let avg_re = 0.5 * (self_re + pair.real[task]);
        let avg_im = 0.5 * (self_im + pair.imag[task]);
        state_vec.real[idx] = retain * self_re + depol_level * avg_re;
        state_vec.imag[idx] = retain * self_im + depol_level * avg_im;
    }
}

/// On-diagonal half of distributed single-qubit amplitude damping:
/// `densmatr_mixDampingDistributed` branches on which bucket this chunk
/// holds — the `|0><0|` bucket absorbs `damping * pair` with no
/// self-scaling, the `|1><1|` bucket decays by `1-damping` with no pair
/// contribution at all. Not the same formula as depolarising's symmetric
/// average.
fn mix_on_diagonal_damping_distributed(qureg: &mut Qureg, target_qubit: u32, damping: f64) {
    let num_tasks = qureg.num_amps_per_chunk as u64 >> 1;
    let retain = 1.0 - damping;
    let pair = qureg
        .pair_state_vec()
        .expect("distributed noise channel requires a populated pair buffer")
        .clone();

    for this_task in 0..num_tasks {
        let (idx, outer_bit) = on_diagonal_index_and_bucket(qureg, target_qubit, this_task);
        let task = this_task as usize;
        let state_vec = qureg.state_vec_mut();
        if outer_bit == 0 {
            state_vec.real[idx] += damping * pair.real[task];
            state_vec.imag[idx] += damping * pair.imag[task];
        } else {
            state_vec.real[idx] *= retain;
            state_vec.imag[idx] *= retain;
        }
    }
}

/// Two-qubit depolarising channel, both qubits' row/column partners inside
/// this chunk. Runs QuEST's three-step decomposition exactly (step three's
/// `partner ^= totMaskQubit1` order, not `|=`, is load-bearing — see
/// `DESIGN.md`'s Open Question entry).
pub fn mix_two_qubit_depolarising_local(qureg: &mut Qureg, qubit1: u32, qubit2: u32, delta: f64, gamma: f64) {
    let n = qureg.num_qubits_represented;
    let tot_mask1 = (1u64 << qubit1) | (1u64 << (qubit1 + n));
    let tot_mask2 = (1u64 << qubit2) | (1u64 << (qubit2 + n));
    let num_amps = qureg.num_amps_per_chunk;
    let chunk_offset = qureg.global_index(0);

    let pattern = |task: usize| {
        let g = chunk_offset + task as u64;
        (g & tot_mask1, g & tot_mask2)
    };

    let state_vec = qureg.state_vec_mut();

    // step one: |...X...0...><...X...0...| for either X, mixed with the Q1 flip.
    for this_task in 0..num_amps {
        let (p1, p2) = pattern(this_task);
        if p1 == 0 && (p2 == 0 || p2 == tot_mask2) {
            let partner = this_task | tot_mask1 as usize;
            let (re00, im00) = (state_vec.real[this_task], state_vec.imag[this_task]);
            state_vec.real[this_task] += delta * state_vec.real[partner];
            state_vec.imag[this_task] += delta * state_vec.imag[partner];
            state_vec.real[partner] += delta * re00;
            state_vec.imag[partner] += delta * im00;
        }
    }

    // step two: |...0...X...><...0...X...| for either X, mixed with the Q2 flip.
    for this_task in 0..num_amps {
        let (p1, p2) = pattern(this_task);
        if p2 == 0 && (p1 == 0 || p1 == tot_mask1) {
            let partner = this_task | tot_mask2 as usize;
            let (re00, im00) = (state_vec.real[this_task], state_vec.imag[this_task]);
            state_vec.real[this_task] += delta * state_vec.real[partner];
            state_vec.imag[this_task] += delta * state_vec.imag[partner];
            state_vec.real[partner] += delta * re00;
            state_vec.imag[partner] += delta * im00;
        }
    }

    // step three: on-diagonal |00><00|/|11><11| pairs, scaled by gamma.
    for this_task in 0..num_amps {
        let (p1, p2) = pattern(this_task);
        if p2 == 0 && (p1 == 0 || p1 == tot_mask1) {
            let partner = (this_task | tot_mask2 as usize) ^ tot_mask1 as usize;
            let (re00, im00) = (state_vec.real[this_task], state_vec.imag[this_task]);
            state_vec.real[this_task] = gamma * (state_vec.real[this_task] + delta * state_vec.real[partner]);
            state_vec.imag[this_task] = gamma * (state_vec.imag[this_task] + delta * state_vec.imag[partner]);
            state_vec.real[partner] = gamma * (state_vec.real[partner] + delta * re00);
            state_vec.imag[partner] = gamma * (state_vec.imag[partner] + delta * im00);
        }
    }
}

/// Distributed two-qubit depolarising step: combines this chunk's half of
/// each touched inner block with the matching element of `pair_state_vec`,
/// which the composer must fill per step (the composer calls this three
/// times per gate — `gamma = 1` for the first two dephasing-only passes,
/// the real `gamma` only on the third — matching
/// `densmatr_mixTwoQubitDepolarisingDistributed`'s single-chunk-per-qubit
/// contract; the distributed specializations that additionally special-case
/// "qubit1 local, qubit2 distributed" are composer-level call-shape
/// optimizations that this general form already covers behaviorally).
pub fn mix_two_qubit_depolarising_distributed(
    qureg: &mut Qureg,
    target_qubit: u32,
    qubit2: u32,
    delta: f64,
    gamma: f64,
) {
    let n = qureg.num_qubits_represented;
    let size_inner_half_block_q1 = 1u64 << target_qubit;
    let size_inner_half_block_q2 = 1u64 << qubit2;
    let size_inner_quarter_block_q2 = size_inner_half_block_q2 >> 1;
    let size_inner_block_q2 = size_inner_half_block_q2 << 1;
    let size_inner_block_q1 = 2 * size_inner_half_block_q1;
    let size_outer_column = 1u64 << n;
    let size_outer_quarter_column = size_outer_column >> 2;
    let num_tasks = qureg.num_amps_per_chunk as u64 >> 2;
    let chunk_id = qureg.chunk_id as u64;
    let num_amps_per_chunk = qureg.num_amps_per_chunk as u64;

    let pair = qureg
        .pair_state_vec()
        .expect("distributed noise channel requires a populated pair buffer")
        .clone();
    let state_vec = qureg.state_vec_mut();

    for this_task in 0..num_tasks {
        let this_outer_column = this_task / size_outer_quarter_column;
        let this_index_in_outer_column = this_task & (size_outer_quarter_column - 1);
        let this_inner_block_q2 = this_index_in_outer_column / size_inner_quarter_block_q2;
        let this_index_in_inner_block_q2 = this_task & (size_inner_quarter_block_q2 - 1);
        let this_inner_block_q1_in_inner_block_q2 = this_index_in_inner_block_q2 / size_inner_half_block_q1;
        let this_index_in_inner_block_q1 = this_task & (size_inner_half_block_q1 - 1);

        let mut this_index = this_outer_column * size_outer_column
            + this_inner_block_q2 * size_inner_block_q2
            + this_inner_block_q1_in_inner_block_q2 * size_inner_block_q1
            + this_index_in_inner_block_q1;

        let outer_bit_q1 = extract_bit(target_qubit, (this_index + num_amps_per_chunk * chunk_id) >> n) as u64;
        this_index += outer_bit_q1 * size_inner_half_block_q1;

        let outer_bit_q2 = extract_bit(qubit2, (this_index + num_amps_per_chunk * chunk_id) >> n) as u64;
        this_index += outer_bit_q2 * (size_inner_quarter_block_q2 << 1);

        let idx = this_index as usize;
        let task = this_task as usize;
        state_vec.real[idx] = gamma * (state_vec.real[idx] + delta * pair.real[task]);
        state_vec.imag[idx] = gamma * (state_vec.imag[idx] + delta * pair.imag[task]);
    }
}

/// Mixes `other` into `combine` in place: `combine = (1-p)*combine +
/// p*other`. Both registers must share `num_amps_per_chunk`.
pub fn mix_density_matrix(combine: &mut Qureg, other_prob: f64, other: &Qureg) {
    debug_assert_eq!(combine.num_amps_per_chunk, other.num_amps_per_chunk);
    let other_sv = other.state_vec();
    let combine_sv = combine.state_vec_mut();
    combine_sv
        .real
        .par_iter_mut()
        .zip(combine_sv.imag.par_iter_mut())
        .zip(other_sv.real.par_iter().zip(&other_sv.imag))
        .for_each(|((re, im), (other_re, other_im))| {
            *re = *re * (1.0 - other_prob) + other_prob * other_re;
            *im = *im * (1.0 - other_prob) + other_prob * other_im;
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell_density() -> Qureg {
        let mut q = Qureg::create_density(1, 1, 0).unwrap();
        // |+><+| on a single qubit
        q.init_plus_state();
        q
    }

    #[test]
    fn full_dephasing_kills_off_diagonal_but_preserves_trace() {
        let mut q = bell_density();
        mix_dephasing(&mut q, 0, 1.0);
        assert!(q.state_vec().real[1].abs() < 1e-12); // |0><1|
        assert!(q.state_vec().real[2].abs() < 1e-12); // |1><0|
        let trace = q.state_vec().real[0] + q.state_vec().real[3];
        assert!((trace - 1.0).abs() < 1e-12);
    }

    #[test]
    fn full_depolarising_gives_maximally_mixed_state() {
        let mut q = bell_density();
        mix_depolarising_local(&mut q, 0, 1.0);
        assert!((q.state_vec().real[0] - 0.5).abs() < 1e-9);
        assert!((q.state_vec().real[3] - 0.5).abs() < 1e-9);
        assert!(q.state_vec().real[1].abs() < 1e-9);
        assert!(q.state_vec().real[2].abs() < 1e-9);
    }

    #[test]
    fn full_amplitude_damping_collapses_to_ground_state() {
        let mut q = Qureg::create_density(1, 1, 0).unwrap();
        q.init_classical_state(1); // |1><1|
        mix_damping_local(&mut q, 0, 1.0);
        assert!((q.state_vec().real[0] - 1.0).abs() < 1e-9);
        assert!(q.state_vec().real[3].abs() < 1e-9);
    }

    #[test]
    fn depolarising_distributed_matches_local_across_a_two_chunk_split() {
        let mut reference = Qureg::create_density(1, 1, 0).unwrap();
        reference.init_debug_state();
        mix_depolarising_local(&mut reference, 0, 0.6);

        let mut chunk0 = Qureg::create_density(1, 2, 0).unwrap();
        let mut chunk1 = Qureg::create_density(1, 2, 1).unwrap();
        chunk0.init_debug_state();
        chunk1.init_debug_state();
        let pair_for_0 = chunk1.state_vec().clone();
        let pair_for_1 = chunk0.state_vec().clone();
        *chunk0.pair_state_vec_mut().unwrap() = pair_for_0;
        *chunk1.pair_state_vec_mut().unwrap() = pair_for_1;

        mix_depolarising_distributed(&mut chunk0, 0, 0.6);
        mix_depolarising_distributed(&mut chunk1, 0, 0.6);

        assert!((chunk0.state_vec().real[0] - reference.state_vec().real[0]).abs() < 1e-9);
        assert!((chunk0.state_vec().real[1] - reference.state_vec().real[1]).abs() < 1e-9);
        assert!((chunk1.state_vec().real[0] - reference.state_vec().real[2]).abs() < 1e-9);
        assert!((chunk1.state_vec().real[1] - reference.state_vec().real[3]).abs() < 1e-9);
    }

    #[test]
    fn damping_distributed_matches_local_across_a_two_chunk_split() {
        let mut reference = Qureg::create_density(1, 1, 0).unwrap();
        reference.init_classical_state(1); // |1><1|
        mix_damping_local(&mut reference, 0, 0.7);

        let mut chunk0 = Qureg::create_density(1, 2, 0).unwrap();
        let mut chunk1 = Qureg::create_density(1, 2, 1).unwrap();
        chunk0.init_classical_state(1);
        chunk1.init_classical_state(1);
        let pair_for_0 = chunk1.state_vec().clone();
        let pair_for_1 = chunk0.state_vec().clone();
        *chunk0.pair_state_vec_mut().unwrap() = pair_for_0;
        *chunk1.pair_state_vec_mut().unwrap() = pair_for_1;

        mix_damping_distributed(&mut chunk0, 0, 0.7);
        mix_damping_distributed(&mut chunk1, 0, 0.7);

        assert!((chunk0.state_vec().real[0] - reference.state_vec().real[0]).abs() < 1e-9);
        assert!((chunk0.state_vec().real[1] - reference.state_vec().real[1]).abs() < 1e-9);
        assert!((chunk1.state_vec().real[0] - reference.state_vec().real[2]).abs() < 1e-9);
        assert!((chunk1.state_vec().real[1] - reference.state_vec().real[3]).abs() < 1e-9);
    }

    #[test]
    fn two_qubit_depolarising_distributed_is_identity_when_delta_zero() {
        // delta=0 eliminates the pair-buffer contribution entirely, so the
        // distributed index arithmetic should leave every amplitude as
        // gamma*self with gamma=1 — a no-op regardless of what the pair
        // buffer holds.
        let mut q = Qureg::create_density(2, 2, 0).unwrap();
        q.init_debug_state();
        let before = q.state_vec().clone();
        *q.pair_state_vec_mut().unwrap() = before.clone();
        mix_two_qubit_depolarising_distributed(&mut q, 0, 1, 0.0, 1.0);
        assert_eq!(q.state_vec().real, before.real);
        assert_eq!(q.state_vec().imag, before.imag);
    }

    #[test]
    fn mix_density_matrix_is_convex_combination() {
        let mut a = Qureg::create_density(1, 1, 0).unwrap();
        let mut b = Qureg::create_density(1, 1, 0).unwrap();
        a.init_classical_state(0);
        b.init_classical_state(1);
        mix_density_matrix(&mut a, 0.5, &b);
        assert!((a.state_vec().real[0] - 0.5).abs() < 1e-12);
        assert!((a.state_vec().real[3] - 0.5).abs() < 1e-12);
    }
}
