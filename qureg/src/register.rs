// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Register store (R): owns the amplitude arrays and register metadata.

use log::{debug, trace};

use crate::amplitude::AmplitudeArray;
use crate::error::QuregError;

/// A quantum register: either a pure-state amplitude vector (2^N entries) or
/// a density matrix (4^N entries), partitioned across `num_chunks` equally
/// sized chunks. This process holds exactly one chunk; `pair_state_vec`
/// receives the paired chunk's amplitudes from the (external) transport
/// before a distributed kernel runs.
#[derive(Debug, Clone)]
pub struct Qureg {
    pub num_qubits_represented: u32,
    pub is_density_matrix: bool,
    pub num_amps_total: u64,
    pub num_chunks: usize,
    pub chunk_id: usize,
    pub num_amps_per_chunk: usize,
    pub(crate) state_vec: AmplitudeArray,
    pub(crate) pair_state_vec: Option<AmplitudeArray>,
}

impl Qureg {
    /// Allocates a pure-state register of `num_qubits` qubits, split into
    /// `num_chunks` equal chunks, this process owning `chunk_id`.
    ///
    /// # Errors
    /// Returns [`QuregError`] if `num_chunks` isn't a power of two, doesn't
    /// evenly divide the total amplitude count, or the per-chunk amplitude
    /// count would overflow `usize` on this platform.
    pub fn create(num_qubits: u32, num_chunks: usize, chunk_id: usize) -> Result<Self, QuregError> {
        Self::create_impl(num_qubits, num_chunks, chunk_id, false)
    }

    /// Allocates a density-matrix register of `num_qubits` logical qubits
    /// (4^N amplitudes total), split into `num_chunks` equal chunks.
    ///
    /// # Errors
    /// See [`Qureg::create`].
    pub fn create_density(
        num_qubits: u32,
        num_chunks: usize,
        chunk_id: usize,
    ) -> Result<Self, QuregError> {
        Self::create_impl(num_qubits, num_chunks, chunk_id, true)
    }

    fn create_impl(
        num_qubits: u32,
        num_chunks: usize,
        chunk_id: usize,
        is_density_matrix: bool,
    ) -> Result<Self, QuregError> {
        if num_chunks == 0 || !num_chunks.is_power_of_two() {
            return Err(QuregError::ChunkCountNotPowerOfTwo(num_chunks));
        }

        let exponent = if is_density_matrix {
            2 * num_qubits
        } else {
            num_qubits
        };
        let num_amps_total: u128 = 1u128 << exponent;
        let num_chunks_u128 = num_chunks as u128;
        if num_amps_total % num_chunks_u128 != 0 {
            return Err(QuregError::UnevenChunking {
                num_amps_total: u64::try_from(num_amps_total).unwrap_or(u64::MAX),
                num_chunks,
            });
        }

        let num_amps_per_chunk_u128 = num_amps_total / num_chunks_u128;
        let num_amps_per_chunk = usize::try_from(num_amps_per_chunk_u128).map_err(|_| {
            QuregError::ResourceExhausted {
                requested: num_amps_per_chunk_u128,
            }
        })?;

        debug!(
            "creating {}qubit {} register: {num_chunks} chunks x {num_amps_per_chunk} amps",
            num_qubits,
            if is_density_matrix { "density" } else { "statevec" },
        );

        let state_vec = AmplitudeArray::zeroed(num_amps_per_chunk);
        let pair_state_vec = (num_chunks > 1).then(|| AmplitudeArray::zeroed(num_amps_per_chunk));

        Ok(Self {
            num_qubits_represented: num_qubits,
            is_density_matrix,
            num_amps_total: u64::try_from(num_amps_total).unwrap_or(u64::MAX),
            num_chunks,
            chunk_id,
            num_amps_per_chunk,
            state_vec,
            pair_state_vec,
        })
    }

    #[must_use]
    pub fn state_vec(&self) -> &AmplitudeArray {
        &self.state_vec
    }

    pub fn state_vec_mut(&mut self) -> &mut AmplitudeArray {
        &mut self.state_vec
    }

    #[must_use]
    pub fn pair_state_vec(&self) -> Option<&AmplitudeArray> {
        self.pair_state_vec.as_ref()
    }

    pub fn pair_state_vec_mut(&mut self) -> Option<&mut AmplitudeArray> {
        self.pair_state_vec.as_mut()
    }

    /// Global index of local position `i` in this chunk.
    #[inline]
    #[must_use]
    pub fn global_index(&self, local_index: usize) -> u64 {
        self.chunk_id as u64 * self.num_amps_per_chunk as u64 + local_index as u64
    }

    /// Zeroes every local amplitude.
    pub fn init_blank(&mut self) {
        trace!("init_blank: {} amps", self.num_amps_per_chunk);
        self.state_vec.real.fill(0.0);
        self.state_vec.imag.fill(0.0);
    }

    /// `|00...0>` for a pure state, or the all-zero matrix awaiting a
    /// classical-state write for a density matrix.
    pub fn init_zero_state(&mut self) {
        self.init_blank();
        if self.chunk_id == 0 {
            self.state_vec.real[0] = 1.0;
        }
    }

    /// Equal superposition `|+++...+>` (pure), or the maximally mixed
    /// density matrix `sum_ij (1/2^N) |i><j|` (density).
    pub fn init_plus_state(&mut self) {
        if self.is_density_matrix {
            let dim = 1u64 << self.num_qubits_represented;
            let prob_factor = 1.0 / dim as f64;
            self.state_vec.real.fill(prob_factor);
            self.state_vec.imag.fill(0.0);
        } else {
            let total = self.num_amps_per_chunk as u64 * self.num_chunks as u64;
            let norm_factor = 1.0 / (total as f64).sqrt();
            self.state_vec.real.fill(norm_factor);
            self.state_vec.imag.fill(0.0);
        }
    }

    /// Classical basis state `|state_ind>` (pure), or `|state_ind><state_ind|`
    /// (density).
    pub fn init_classical_state(&mut self, state_ind: u64) {
        self.init_blank();
        if self.is_density_matrix {
            let density_dim = 1u64 << self.num_qubits_represented;
            let density_ind = (density_dim + 1) * state_ind;
            if self.chunk_id as u64 == density_ind / self.num_amps_per_chunk as u64 {
                let local = (density_ind % self.num_amps_per_chunk as u64) as usize;
                self.state_vec.real[local] = 1.0;
            }
        } else if self.chunk_id as u64 == state_ind / self.num_amps_per_chunk as u64 {
            let local = (state_ind % self.num_amps_per_chunk as u64) as usize;
            self.state_vec.real[local] = 1.0;
        }
    }

    /// Deterministic non-physical debug fill: `real = 2g/10`, `imag =
    /// (2g+1)/10` at global index `g`. Used by tests that need a fixed,
    /// easily hand-checked starting state.
    pub fn init_debug_state(&mut self) {
        let offset = self.num_amps_per_chunk as u64 * self.chunk_id as u64;
        for i in 0..self.num_amps_per_chunk {
            let g = offset + i as u64;
            self.state_vec.real[i] = (g as f64 * 2.0) / 10.0;
            self.state_vec.imag[i] = (g as f64 * 2.0 + 1.0) / 10.0;
        }
    }

    /// Initialises `qubit_id` to `outcome` and every other qubit to an equal
    /// superposition.
    pub fn init_state_of_single_qubit(&mut self, qubit_id: u32, outcome: u8) {
        let total = self.num_amps_per_chunk as u64 * self.num_chunks as u64;
        let norm_factor = 1.0 / (total as f64 / 2.0).sqrt();
        let offset = self.num_amps_per_chunk as u64 * self.chunk_id as u64;
        for i in 0..self.num_amps_per_chunk {
            let bit = crate::index_algebra::extract_bit(qubit_id, offset + i as u64);
            if bit == outcome {
                self.state_vec.real[i] = norm_factor;
                self.state_vec.imag[i] = 0.0;
            } else {
                self.state_vec.real[i] = 0.0;
                self.state_vec.imag[i] = 0.0;
            }
        }
    }

    /// Embeds a pure state's density matrix `|psi><psi|` into `self`
    /// (already a density register). `self.pair_state_vec` must already hold
    /// the full pure-state vector, gathered by the external transport.
    /// `pure_num_amps_total` and `pure_num_amps_per_chunk` describe the
    /// shape of the source statevector register.
    pub fn init_pure_state_into_density(
        &mut self,
        pure_num_amps_total: u64,
        pure_num_amps_per_chunk: usize,
    ) {
        let pair = self
            .pair_state_vec
            .as_ref()
            .expect("init_pure_state_into_density requires a populated pair buffer");
        let rows_per_node = pure_num_amps_total as usize;
        let col_offset = self.chunk_id * pure_num_amps_per_chunk;
        for col in 0..pure_num_amps_per_chunk {
            let bra_re = pair.real[col + col_offset];
            let bra_im = -pair.imag[col + col_offset];
            for row in 0..rows_per_node {
                let ket_re = pair.real[row];
                let ket_im = pair.imag[row];
                let index = row + col * rows_per_node;
                self.state_vec.real[index] = ket_re * bra_re - ket_im * bra_im;
                self.state_vec.imag[index] = ket_re * bra_im + ket_im * bra_re;
            }
        }
    }

    /// Copies every local amplitude from `src` into `self`. Both registers
    /// must share `num_amps_per_chunk`.
    pub fn clone_from(&mut self, src: &Qureg) {
        debug_assert_eq!(self.num_amps_per_chunk, src.num_amps_per_chunk);
        self.state_vec.real.copy_from_slice(&src.state_vec.real);
        self.state_vec.imag.copy_from_slice(&src.state_vec.imag);
    }

    /// Writes `reals`/`imags` at global positions `[start_ind, start_ind +
    /// reals.len())`, applying only the subrange that falls in this chunk.
    pub fn set_amps(&mut self, start_ind: i64, reals: &[f64], imags: &[f64]) {
        debug_assert_eq!(reals.len(), imags.len());
        let num_amps = reals.len() as i64;
        let chunk_start = self.chunk_id as i64 * self.num_amps_per_chunk as i64;
        let mut local_start = start_ind - chunk_start;
        let local_end = (local_start + num_amps).min(self.num_amps_per_chunk as i64);
        local_start = local_start.max(0);
        let offset = chunk_start - start_ind;

        let mut i = local_start;
        while i < local_end {
            let src = (i + offset) as usize;
            self.state_vec.real[i as usize] = reals[src];
            self.state_vec.imag[i as usize] = imags[src];
            i += 1;
        }
    }

    /// True iff every local amplitude of `self` and `other` agrees within
    /// `precision` on both real and imaginary parts.
    #[must_use]
    pub fn compare_states(&self, other: &Qureg, precision: f64) -> bool {
        self.state_vec
            .real
            .iter()
            .zip(&other.state_vec.real)
            .all(|(a, b)| (a - b).abs() <= precision)
            && self
                .state_vec
                .imag
                .iter()
                .zip(&other.state_vec.imag)
                .all(|(a, b)| (a - b).abs() <= precision)
    }

    /// `"<N>qubits_CPU_<numChunks>ranksx<numThreads>threads"`, matching the
    /// teacher's CPU environment string format.
    #[must_use]
    pub fn environment_string(&self) -> String {
        let num_threads = rayon::current_num_threads();
        format!(
            "{}qubits_CPU_{}ranksx{num_threads}threads",
            self.num_qubits_represented, self.num_chunks
        )
    }
}
