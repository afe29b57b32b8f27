// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Scalar and register-to-register reductions (K_R): purity, inner products,
//! distances, fidelity, total probability, and the weighted/parity-swap
//! amplitude rewrites that don't fit the gate-kernel shape.

use rayon::prelude::*;

use crate::index_algebra::flip_bit;
use crate::kernel::C;
use crate::register::Qureg;

/// `Tr(rho^2)` restricted to this chunk's local contribution: sum of
/// `|rho_ij|^2` over every amplitude held here. Callers sum chunk results
/// across the distributed register to get the global purity.
#[must_use]
pub fn purity(qureg: &Qureg) -> f64 {
    debug_assert!(qureg.is_density_matrix);
    let sv = qureg.state_vec();
    sv.real
        .par_iter()
        .zip(&sv.imag)
        .map(|(re, im)| re * re + im * im)
        .sum()
}

/// `<bra|ket>` restricted to this chunk's local contribution, for two pure
/// states sharing the same chunking.
#[must_use]
pub fn inner_product(bra: &Qureg, ket: &Qureg) -> C {
    debug_assert!(!bra.is_density_matrix && !ket.is_density_matrix);
    let (b, k) = (bra.state_vec(), ket.state_vec());
    let (mut re, mut im) = (0.0, 0.0);
    for i in 0..b.len() {
        let (br, bi) = (b.real[i], -b.imag[i]);
        let (kr, ki) = (k.real[i], k.imag[i]);
        re += br * kr - bi * ki;
        im += br * ki + bi * kr;
    }
    C::new(re, im)
}

/// `Tr((rho - sigma)^\dagger (rho - sigma))` restricted to this chunk's
/// local contribution.
#[must_use]
pub fn hs_distance_squared(rho: &Qureg, sigma: &Qureg) -> f64 {
    debug_assert!(rho.is_density_matrix && sigma.is_density_matrix);
    let (a, b) = (rho.state_vec(), sigma.state_vec());
    a.real
        .par_iter()
        .zip(&a.imag)
        .zip(b.real.par_iter().zip(&b.imag))
        .map(|((ar, ai), (br, bi))| {
            let (dr, di) = (ar - br, ai - bi);
            dr * dr + di * di
        })
        .sum()
}

/// `<psi| rho |psi>` restricted to this chunk's local contribution, for
/// density matrix `rho` and pure state `psi` fully available in
/// `pair_state_vec`.
#[must_use]
pub fn fidelity(rho: &Qureg, psi_pair: &crate::amplitude::AmplitudeArray) -> f64 {
    debug_assert!(rho.is_density_matrix);
    let dim = psi_pair.len();
    let sv = rho.state_vec();
    let first_col = rho.global_index(0) as usize / dim;
    let mut total = 0.0;
    for local_col in 0..(sv.len() / dim) {
        let col = first_col + local_col;
        let (psi_col_re, psi_col_im) = (psi_pair.real[col], psi_pair.imag[col]);
        for row in 0..dim {
            let index = local_col * dim + row;
            let (rho_re, rho_im) = (sv.real[index], sv.imag[index]);
            let (psi_row_re, psi_row_im) = (psi_pair.real[row], psi_pair.imag[row]);
            // <psi|rho|psi> term: conj(psi_row) * rho_{row,col} * psi_col
            let term_re = rho_re * psi_col_re - rho_im * psi_col_im;
            let term_im = rho_re * psi_col_im + rho_im * psi_col_re;
            total += psi_row_re * term_re + psi_row_im * term_im;
        }
    }
    total
}

/// Sum of `|amp|^2` over this chunk's local amplitudes, for a pure state.
#[must_use]
pub fn calc_total_prob_pure(qureg: &Qureg) -> f64 {
    debug_assert!(!qureg.is_density_matrix);
    let sv = qureg.state_vec();
    sv.real
        .par_iter()
        .zip(&sv.imag)
        .map(|(re, im)| re * re + im * im)
        .sum()
}

/// Sum of the real part of the diagonal entries held in this chunk, for a
/// density matrix: `Tr(rho)` restricted to the local contribution.
#[must_use]
pub fn calc_total_prob_density(qureg: &Qureg) -> f64 {
    debug_assert!(qureg.is_density_matrix);
    let dim = 1u64 << qureg.num_qubits_represented;
    let sv = qureg.state_vec();
    let offset = qureg.global_index(0);
    (0..sv.len())
        .filter(|&i| {
            let g = offset + i as u64;
            g % (dim + 1) == 0
        })
        .map(|i| sv.real[i])
        .sum()
}

/// `Tr(rho sigma)` restricted to this chunk's local contribution, for two
/// density matrices sharing the same chunking — the density-matrix analogue
/// of [`inner_product`].
#[must_use]
pub fn densmatr_inner_product(rho: &Qureg, sigma: &Qureg) -> C {
    debug_assert!(rho.is_density_matrix && sigma.is_density_matrix);
    let (a, b) = (rho.state_vec(), sigma.state_vec());
    let (mut re, mut im) = (0.0, 0.0);
    for i in 0..a.len() {
        let (ar, ai) = (a.real[i], a.imag[i]);
        let (br, bi) = (b.real[i], b.imag[i]);
        re += ar * br - ai * bi;
        im += ar * bi + ai * br;
    }
    C::new(re, im)
}

/// Overwrites `out` in place with `fac1 * qureg1 + fac2 * qureg2 + fac_out *
/// out`, amplitude by amplitude (`statevec_setWeightedQureg`'s three-term
/// combination, `out` itself contributing via `fac_out`).
pub fn set_weighted_qureg(out: &mut Qureg, fac1: C, qureg1: &Qureg, fac2: C, qureg2: &Qureg, fac_out: C) {
    debug_assert_eq!(out.num_amps_per_chunk, qureg1.num_amps_per_chunk);
    debug_assert_eq!(out.num_amps_per_chunk, qureg2.num_amps_per_chunk);
    let (a, b) = (qureg1.state_vec().clone(), qureg2.state_vec().clone());
    let out_sv = out.state_vec_mut();
    for i in 0..out_sv.len() {
        let term1 = fac1 * C::new(a.real[i], a.imag[i]);
        let term2 = fac2 * C::new(b.real[i], b.imag[i]);
        let term_out = fac_out * C::new(out_sv.real[i], out_sv.imag[i]);
        let sum = term1 + term2 + term_out;
        out_sv.real[i] = sum.re;
        out_sv.imag[i] = sum.im;
    }
}

/// Swaps the amplitudes of basis states that differ only by exchanging
/// `qubit1` and `qubit2`, local variant (both partners live in this chunk).
pub fn swap_qubit_amps_local(qureg: &mut Qureg, qubit1: u32, qubit2: u32) {
    let chunk_offset = qureg.global_index(0);
    let num_amps = qureg.num_amps_per_chunk;
    let state_vec = qureg.state_vec_mut();
    for i in 0..num_amps {
        let g = chunk_offset + i as u64;
        let bit1 = (g >> qubit1) & 1;
        let bit2 = (g >> qubit2) & 1;
        if bit1 != bit2 {
            let partner_g = flip_bit(flip_bit(g, qubit1), qubit2);
            let partner = (partner_g - chunk_offset) as usize;
            if partner > i {
                state_vec.real.swap(i, partner);
                state_vec.imag.swap(i, partner);
            }
        }
    }
}

/// Distributed half of the qubit swap: copies this chunk's amplitudes at
/// basis states with differing `qubit1`/`qubit2` bits from the paired
/// chunk, for the chunk holding the opposite parity. The pair buffer is
/// indexed by the *target* position's local index within the paired chunk
/// (`targetGlobalIndex % numAmpsPerChunk` in `statevec_swapQubitAmpsDistributed`),
/// not by `i` — flipping a within-chunk qubit bit moves the position within
/// the chunk, so the two indices coincide only when both `qubit1` and
/// `qubit2` are higher-order (chunk-selecting) bits.
pub fn swap_qubit_amps_distributed(qureg: &mut Qureg, qubit1: u32, qubit2: u32) {
    let chunk_offset = qureg.global_index(0);
    let num_amps = qureg.num_amps_per_chunk as u64;
    let pair = qureg
        .pair_state_vec()
        .expect("distributed swap requires a populated pair buffer")
        .clone();
    let state_vec = qureg.state_vec_mut();
    for i in 0..state_vec.len() {
        let g = chunk_offset + i as u64;
        let bit1 = (g >> qubit1) & 1;
        let bit2 = (g >> qubit2) & 1;
        if bit1 != bit2 {
            let partner_g = flip_bit(flip_bit(g, qubit1), qubit2);
            let pair_local_index = (partner_g % num_amps) as usize;
            state_vec.real[i] = pair.real[pair_local_index];
            state_vec.imag[i] = pair.imag[pair_local_index];
        }
    }
}
