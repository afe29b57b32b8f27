// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structure-of-arrays amplitude storage.

/// A chunk of complex amplitudes stored as separate real and imaginary
/// `Vec<f64>`, matching the teacher's `ComplexArray`-style split rather than
/// an interleaved `Vec<Complex<f64>>`: kernels stride over `real`/`imag`
/// independently, which is what lets the SIMD fast paths load four
/// contiguous lanes from each half without de-interleaving first.
#[derive(Debug, Clone)]
pub struct AmplitudeArray {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl AmplitudeArray {
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self {
            real: vec![0.0; len],
            imag: vec![0.0; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.real.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }
}
