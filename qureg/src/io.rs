// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! File-based amplitude loading and console reporting (IO).
//!
//! Kept deliberately thin: no serialization crate is pulled in because the
//! file format is a plain comma-separated `<real>, <imag>` text stream, one
//! amplitude per line, `#`-prefixed lines ignored — matching spec.md §6's
//! state-vector text format.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::register::Qureg;

/// Parses `<real>, <imag>` amplitudes out of `path` into `qureg`'s chunk,
/// skipping blank and `#`-prefixed lines. Returns `false` (without mutating
/// `qureg`) if the file doesn't exist, can't be parsed, or doesn't supply
/// exactly `num_amps_total` amplitudes.
#[must_use]
pub fn init_state_from_single_file(qureg: &mut Qureg, path: &Path) -> bool {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(err) => {
            warn!("init_state_from_single_file: couldn't open {}: {err}", path.display());
            return false;
        }
    };

    let mut reals = Vec::with_capacity(qureg.num_amps_total as usize);
    let mut imags = Vec::with_capacity(qureg.num_amps_total as usize);
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => return false,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split(',').map(str::trim);
        let (Some(re_str), Some(im_str)) = (parts.next(), parts.next()) else {
            return false;
        };
        let (Ok(re), Ok(im)) = (re_str.parse::<f64>(), im_str.parse::<f64>()) else {
            return false;
        };
        reals.push(re);
        imags.push(im);
    }

    if reals.len() as u64 != qureg.num_amps_total {
        warn!(
            "init_state_from_single_file: expected {} amplitudes, found {}",
            qureg.num_amps_total,
            reals.len()
        );
        return false;
    }

    qureg.set_amps(0, &reals, &imags);
    true
}

/// Writes a human-readable dump of `qureg`'s amplitudes to stdout. Matches
/// `statevec_reportStateToScreen`'s guard against flooding the terminal for
/// anything beyond a handful of qubits.
pub fn report_state_to_screen(qureg: &Qureg, rank: usize) {
    const MAX_QUBITS_TO_PRINT: u32 = 5;
    if qureg.num_qubits_represented > MAX_QUBITS_TO_PRINT {
        info!(
            "report_state_to_screen: suppressed, {} qubits exceeds the {MAX_QUBITS_TO_PRINT}-qubit print limit",
            qureg.num_qubits_represented
        );
        return;
    }
    let sv = qureg.state_vec();
    println!("rank {rank} reporting {} amplitudes:", sv.len());
    for i in 0..sv.len() {
        println!("{}, {}", sv.real[i], sv.imag[i]);
    }
}
