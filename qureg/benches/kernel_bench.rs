// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unit_arg)]

use criterion::{criterion_group, criterion_main, Criterion};
use qureg::kernel::controlled::controlled_not_local;
use qureg::kernel::single_qubit::hadamard_local;
use qureg::Qureg;
use std::hint::black_box;

const NUM_QUBITS: u32 = 16;

fn fresh_register() -> Qureg {
    let mut q = Qureg::create(NUM_QUBITS, 1, 0).unwrap();
    q.init_zero_state();
    q
}

fn hadamard_sweep(c: &mut Criterion) {
    c.bench_function("hadamard sweep, 16 qubits", |b| {
        b.iter(|| {
            let mut q = fresh_register();
            for target in 0..NUM_QUBITS {
                hadamard_local(&mut q, target);
            }
            black_box(q)
        });
    });
}

fn ghz_chain(c: &mut Criterion) {
    c.bench_function("ghz chain, 16 qubits", |b| {
        b.iter(|| {
            let mut q = fresh_register();
            hadamard_local(&mut q, 0);
            for target in 1..NUM_QUBITS {
                controlled_not_local(&mut q, target - 1, target);
            }
            black_box(q)
        });
    });
}

criterion_group!(benches, hadamard_sweep, ghz_chain);
criterion_main!(benches);
