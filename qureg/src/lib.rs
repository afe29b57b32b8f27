// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Amplitude-manipulation core for a full-state quantum circuit simulator.
//!
//! This crate owns the register storage ([`register::Qureg`]) and the
//! catalogue of local/distributed gate kernels, density-matrix noise
//! channels, measurement/collapse primitives, and scalar reductions that
//! operate on it. It does not schedule circuits, parse a wire format, or
//! pick between CPU/GPU/distributed backends — those concerns live one
//! layer up, in whatever composes these kernels into a simulator.

pub mod amplitude;
pub mod error;
pub mod gpu;
pub mod index_algebra;
pub mod io;
pub mod kernel;
pub mod reductions;
pub mod register;

pub use amplitude::AmplitudeArray;
pub use error::QuregError;
pub use register::Qureg;
