//! Memory probing and mode selection
//!
//! Gantree: L4_Engine → MemoryProbe, select_path
//!
//! The direct path needs the dense m×m matrix in memory; the policy only
//! picks it when the estimate fits in half of what is currently available.

use crate::config::{SolveMethod, SolvePath};
use log::info;
use remit_core::memory::{dense_footprint, MAX_MEMORY_FRACTION};
use sysinfo::System;

/// Source of the currently available memory in bytes
/// Gantree: MemoryProbe // 메모리 조회
pub trait MemoryProbe: Send + Sync {
    /// Available memory in bytes
    fn available_bytes(&self) -> u64;
}

/// Queries the operating system on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemory;

impl MemoryProbe for SystemMemory {
    fn available_bytes(&self) -> u64 {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.available_memory()
    }
}

/// Fixed amount, for reproducible decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemory(pub u64);

impl MemoryProbe for FixedMemory {
    fn available_bytes(&self) -> u64 {
        self.0
    }
}

/// Resolve the requested method to a concrete path for `num_elems` states
/// Gantree: select_path(method,m,threshold,probe) -> SolvePath // 경로 선택
pub fn select_path(
    requested: SolveMethod,
    num_elems: usize,
    iter_threshold: usize,
    probe: &dyn MemoryProbe,
) -> SolvePath {
    match requested {
        SolveMethod::Direct => return SolvePath::Direct,
        SolveMethod::Iterative => return SolvePath::Iterative,
        SolveMethod::Auto => {}
    }
    let footprint = dense_footprint(num_elems as u64);
    let available = probe.available_bytes();
    let budget = (available as f64 * MAX_MEMORY_FRACTION) as u64;
    let path = if num_elems <= iter_threshold && footprint < budget {
        SolvePath::Direct
    } else {
        SolvePath::Iterative
    };
    info!(
        "Selected {} path: m = {}, dense estimate {} bytes, available {} bytes",
        path, num_elems, footprint, available
    );
    path
}

// ============================================================================
// Tests
// ============================================================================
