// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! GPU backend stub.
//!
//! No GPU backend ships in this crate; these functions exist so the kernel
//! dispatch layer has a stable seam to call into if a GPU feature is added
//! later, matching the teacher's own pattern of keeping host/device transfer
//! calls explicit even on CPU-only builds where they are no-ops.

use crate::register::Qureg;

/// No-op: amplitudes already live in host memory.
pub fn copy_state_to_gpu(_qureg: &Qureg) {}

/// No-op: amplitudes already live in host memory.
pub fn copy_state_from_gpu(_qureg: &Qureg) {}
