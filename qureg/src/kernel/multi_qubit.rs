// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Two-qubit and N-qubit unitary kernels (K_N): local-chunk kernels that
//! gather `2^k` amplitudes per task, multiply by a `2^k x 2^k` matrix, and
//! scatter the result back. Both honor an optional control mask.

use rayon::prelude::*;

use crate::index_algebra::{flip_bit, insert_two_zero_bits, insert_zero_bits};
use crate::register::Qureg;

use super::{Matrix4, MatrixN, ScatterBuffer, C};

fn controls_satisfied(global_index: u64, ctrl_mask: u64) -> bool {
    ctrl_mask == 0 || ctrl_mask & global_index == ctrl_mask
}

/// Applies a 4x4 unitary to the pair `(q1, q2)`, gated by `ctrl_mask`.
/// `u` is indexed in the `{|00>, |01>, |10>, |11>}` basis with `q1` the more
/// significant bit of that local pairing (matching
/// `statevec_multiControlledTwoQubitUnitaryLocal`'s `ind00/ind01/ind10/ind11`
/// ordering).
pub fn multi_controlled_two_qubit_unitary_local(
    qureg: &mut Qureg,
    ctrl_mask: u64,
    q1: u32,
    q2: u32,
    u: Matrix4,
) {
    let chunk_offset = qureg.global_index(0);
    let num_tasks = qureg.num_amps_per_chunk as u64 >> 2;

    let buf = ScatterBuffer::new(&mut qureg.state_vec_mut().real, &mut qureg.state_vec_mut().imag);
    (0..num_tasks).into_par_iter().for_each(|task| {
        let ind00 = insert_two_zero_bits(task, q1, q2) as usize;
        if !controls_satisfied(chunk_offset + ind00 as u64, ctrl_mask) {
            return;
        }
        let ind01 = flip_bit(ind00 as u64, q1) as usize;
        let ind10 = flip_bit(ind00 as u64, q2) as usize;
        let ind11 = flip_bit(ind01 as u64, q2) as usize;

        let amps = [buf.read(ind00), buf.read(ind01), buf.read(ind10), buf.read(ind11)];
        let inds = [ind00, ind01, ind10, ind11];
        for (row, &ind) in inds.iter().enumerate() {
            let mut out = C::new(0.0, 0.0);
            for (col, &amp) in amps.iter().enumerate() {
                out += u[row][col] * amp;
            }
            buf.write(ind, out);
        }
    });
}

/// Applies an arbitrary `2^k x 2^k` unitary to `targets`, gated by
/// `ctrl_mask`. `targets[i]` corresponds to row/column bit `i` of `u`, in
/// user-supplied order (not sorted) — the sorted copy is used only to find
/// each task's `|0...0>` base index, matching
/// `statevec_multiControlledMultiQubitUnitaryLocal`.
pub fn multi_controlled_multi_qubit_unitary_local(
    qureg: &mut Qureg,
    ctrl_mask: u64,
    targets: &[u32],
    u: &MatrixN,
) {
    let num_targs = targets.len();
    let num_targ_amps = 1usize << num_targs;
    debug_assert_eq!(u.nrows(), num_targ_amps);
    debug_assert_eq!(u.ncols(), num_targ_amps);

    let mut sorted_targets = targets.to_vec();
    sorted_targets.sort_unstable();

    let chunk_offset = qureg.global_index(0);
    let num_tasks = qureg.num_amps_per_chunk as u64 >> num_targs;

    let buf = ScatterBuffer::new(&mut qureg.state_vec_mut().real, &mut qureg.state_vec_mut().imag);
    (0..num_tasks).into_par_iter().for_each(|task| {
        let ind00 = insert_zero_bits(task, &sorted_targets);
        if !controls_satisfied(chunk_offset + ind00, ctrl_mask) {
            return;
        }

        let mut inds = vec![0usize; num_targ_amps];
        let mut amps = vec![C::new(0.0, 0.0); num_targ_amps];
        for (i, slot) in inds.iter_mut().enumerate() {
            let mut ind = ind00;
            for (t, &target) in targets.iter().enumerate() {
                if (i >> t) & 1 == 1 {
                    ind = flip_bit(ind, target);
                }
            }
            *slot = ind as usize;
        }
        for (i, &ind) in inds.iter().enumerate() {
            amps[i] = buf.read(ind);
        }

        for (row, &ind) in inds.iter().enumerate() {
            let mut out = C::new(0.0, 0.0);
            for (col, &amp) in amps.iter().enumerate() {
                out += u[(row, col)] * amp;
            }
            buf.write(ind, out);
        }
    });
}
