// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end seed scenarios exercising the kernel catalogue against a real
//! `Qureg`, single-chunk (no distributed transport involved).

use qureg::kernel::controlled::{controlled_not_local, controlled_pauli_y_local, multi_controlled_phase_flip};
use qureg::kernel::measurement::{collapse_to_known_prob_outcome_local, find_probability_of_zero_local};
use qureg::kernel::multi_qubit::multi_controlled_two_qubit_unitary_local;
use qureg::kernel::single_qubit::hadamard_local;
use qureg::kernel::{CompactUnitary, Matrix4, C};
use qureg::reductions::calc_total_prob_pure;
use qureg::Qureg;

const EPS: f64 = 1e-9;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < EPS, "expected {a} ~= {b}");
}

fn total_norm(q: &Qureg) -> f64 {
    q.state_vec()
        .real
        .iter()
        .zip(&q.state_vec().imag)
        .map(|(r, i)| r * r + i * i)
        .sum()
}

#[test]
fn bell_pair_from_hadamard_and_cnot() {
    let mut q = Qureg::create(2, 1, 0).unwrap();
    q.init_zero_state();

    hadamard_local(&mut q, 0);
    controlled_not_local(&mut q, 0, 1);

    let r = std::f64::consts::FRAC_1_SQRT_2;
    assert_close(q.state_vec().real[0b00], r);
    assert_close(q.state_vec().real[0b11], r);
    assert_close(q.state_vec().real[0b01], 0.0);
    assert_close(q.state_vec().real[0b10], 0.0);
    assert_close(calc_total_prob_pure(&q), 1.0);
}

#[test]
fn phase_kickback_from_controlled_phase_flip() {
    // |+>|1> through a controlled-Z-like phase flip kicks a global phase
    // of -1 onto the control qubit's |1> component when the target is |1>.
    let mut q = Qureg::create(2, 1, 0).unwrap();
    q.init_state_of_single_qubit(1, 1); // qubit 1 := |1>, qubit 0 in equal superposition
    multi_controlled_phase_flip(&mut q, 0b11); // both qubits set -> |11> negated

    let r = std::f64::consts::FRAC_1_SQRT_2;
    assert_close(q.state_vec().real[0b10], r); // |01> unaffected (qubit1=1 is bit1 => 0b10)
    assert_close(q.state_vec().real[0b11], -r); // |11> negated
}

#[test]
fn ghz_three_from_hadamard_and_two_cnots() {
    let mut q = Qureg::create(3, 1, 0).unwrap();
    q.init_zero_state();
    hadamard_local(&mut q, 0);
    controlled_not_local(&mut q, 0, 1);
    controlled_not_local(&mut q, 1, 2);

    let r = std::f64::consts::FRAC_1_SQRT_2;
    assert_close(q.state_vec().real[0b000], r);
    assert_close(q.state_vec().real[0b111], r);
    for i in 1..7 {
        assert_close(q.state_vec().real[i], 0.0);
    }
    assert_close(calc_total_prob_pure(&q), 1.0);
}

#[test]
fn full_depolarising_single_qubit_reaches_maximally_mixed() {
    use qureg::kernel::density_noise::mix_depolarising_local;

    let mut q = Qureg::create_density(1, 1, 0).unwrap();
    q.init_classical_state(0); // |0><0|
    mix_depolarising_local(&mut q, 0, 1.0);

    assert_close(q.state_vec().real[0], 0.5);
    assert_close(q.state_vec().real[3], 0.5);
    assert_close(q.state_vec().real[1], 0.0);
    assert_close(q.state_vec().real[2], 0.0);
}

#[test]
fn full_amplitude_damping_relaxes_excited_state_to_ground() {
    use qureg::kernel::density_noise::mix_damping_local;

    let mut q = Qureg::create_density(1, 1, 0).unwrap();
    q.init_classical_state(1); // |1><1|
    mix_damping_local(&mut q, 0, 1.0);

    assert_close(q.state_vec().real[0], 1.0);
    assert_close(q.state_vec().real[3], 0.0);
}

#[test]
fn projective_measurement_collapses_plus_state_to_classical_outcome() {
    let mut q = Qureg::create(1, 1, 0).unwrap();
    q.init_plus_state();

    let p0 = find_probability_of_zero_local(&q, 0);
    assert_close(p0, 0.5);

    collapse_to_known_prob_outcome_local(&mut q, 0, 0, p0);
    assert_close(q.state_vec().real[0], 1.0);
    assert_close(q.state_vec().real[1], 0.0);
    assert_close(total_norm(&q), 1.0);
}

#[test]
fn controlled_pauli_y_only_fires_when_control_is_set() {
    let mut q = Qureg::create(2, 1, 0).unwrap();
    q.state_vec_mut().real = vec![0.0, 1.0, 0.0, 0.0]; // |01>, control qubit 0 set
    controlled_pauli_y_local(&mut q, 0, 1, 1.0);
    // Y|0> = i|1> on the target (qubit 1) subspace addressed by this control branch.
    assert_close(q.state_vec().real[0b01], 0.0);
    assert_close(q.state_vec().imag[0b11], 1.0);
}

#[test]
fn two_qubit_unitary_identity_matrix_preserves_bell_pair() {
    let mut q = Qureg::create(2, 1, 0).unwrap();
    q.init_zero_state();
    hadamard_local(&mut q, 0);
    controlled_not_local(&mut q, 0, 1);
    let before = q.state_vec().clone();

    let identity: Matrix4 = [
        [C::new(1.0, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0)],
        [C::new(0.0, 0.0), C::new(1.0, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0)],
        [C::new(0.0, 0.0), C::new(0.0, 0.0), C::new(1.0, 0.0), C::new(0.0, 0.0)],
        [C::new(0.0, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0), C::new(1.0, 0.0)],
    ];
    multi_controlled_two_qubit_unitary_local(&mut q, 0, 0, 1, identity);

    assert_eq!(q.state_vec().real, before.real);
    assert_eq!(q.state_vec().imag, before.imag);
}

#[test]
fn compact_unitary_rotation_is_reversible() {
    let mut q = Qureg::create(1, 1, 0).unwrap();
    q.init_zero_state();

    let theta = 0.9_f64;
    let rot = CompactUnitary {
        alpha: C::new((theta / 2.0).cos(), 0.0),
        beta: C::new(0.0, (theta / 2.0).sin()),
    };
    let rot_inv = CompactUnitary {
        alpha: rot.alpha.conj(),
        beta: -rot.beta,
    };

    qureg::kernel::single_qubit::compact_unitary_local(&mut q, 0, rot);
    qureg::kernel::single_qubit::compact_unitary_local(&mut q, 0, rot_inv);

    assert_close(q.state_vec().real[0], 1.0);
    assert_close(q.state_vec().real[1], 0.0);
    assert_close(q.state_vec().imag[0], 0.0);
    assert_close(q.state_vec().imag[1], 0.0);
}
