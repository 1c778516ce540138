//! Hardware tile engine: AMX instructions through inline assembly.
//!
//! Tile registers are named in the instruction encoding, so loads, stores
//! and zeroing are expanded once per register with `with_tmm!`, and the dot
//! products once per distinct register triple with `tdp!`. Every call is validated
//! against the installed configuration first (see [`super::engine`]); the
//! instructions themselves fault on a bad shape instead of returning an error.

use std::arch::asm;
use std::marker::PhantomData;

use super::engine::{self, DotProduct, TileEngine};
use super::{TileConfig, TileSlot};
use crate::error::{Result, TileError};

// CPUID.(EAX=07H, ECX=0):EDX
const CPUID_AMX_BF16: u32 = 1 << 22;
const CPUID_AMX_TILE: u32 = 1 << 24;
const CPUID_AMX_INT8: u32 = 1 << 25;

/// Expand `$cb!(args.., "tmmN")` for the register backing `$slot`.
macro_rules! with_tmm {
    ($slot:expr, $cb:ident!($($args:tt)*)) => {
        match $slot {
            TileSlot::T0 => $cb!($($args)* "tmm0"),
            TileSlot::T1 => $cb!($($args)* "tmm1"),
            TileSlot::T2 => $cb!($($args)* "tmm2"),
            TileSlot::T3 => $cb!($($args)* "tmm3"),
            TileSlot::T4 => $cb!($($args)* "tmm4"),
            TileSlot::T5 => $cb!($($args)* "tmm5"),
            TileSlot::T6 => $cb!($($args)* "tmm6"),
            TileSlot::T7 => $cb!($($args)* "tmm7"),
        }
    };
}

macro_rules! tileloadd {
    ($base:expr, $stride:expr, $tmm:literal) => {
        asm!(
            concat!("tileloadd ", $tmm, ", [{base} + {stride} * 1]"),
            base = in(reg) $base,
            stride = in(reg) $stride,
            options(nostack, readonly, preserves_flags)
        )
    };
}

macro_rules! tilestored {
    ($base:expr, $stride:expr, $tmm:literal) => {
        asm!(
            concat!("tilestored [{base} + {stride} * 1], ", $tmm),
            base = in(reg) $base,
            stride = in(reg) $stride,
            options(nostack, preserves_flags)
        )
    };
}

macro_rules! tilezero {
    ($tmm:literal) => {
        asm!(concat!("tilezero ", $tmm), options(nostack, nomem, preserves_flags))
    };
}

/// Issue `$insn dst, lhs, rhs` for three distinct tile registers.
///
/// The assembler rejects any repeated register, so only the 336 distinct
/// triples are spelled out. `check_dot` rules out the rest.
macro_rules! tdp {
    ($insn:literal, $dst:expr, $lhs:expr, $rhs:expr) => {
        match ($dst, $lhs, $rhs) {
            (TileSlot::T0, TileSlot::T1, TileSlot::T2) => tdp_asm!($insn, "tmm0, tmm1, tmm2"),
            (TileSlot::T0, TileSlot::T1, TileSlot::T3) => tdp_asm!($insn, "tmm0, tmm1, tmm3"),
            (TileSlot::T0, TileSlot::T1, TileSlot::T4) => tdp_asm!($insn, "tmm0, tmm1, tmm4"),
            (TileSlot::T0, TileSlot::T1, TileSlot::T5) => tdp_asm!($insn, "tmm0, tmm1, tmm5"),
            (TileSlot::T0, TileSlot::T1, TileSlot::T6) => tdp_asm!($insn, "tmm0, tmm1, tmm6"),
            (TileSlot::T0, TileSlot::T1, TileSlot::T7) => tdp_asm!($insn, "tmm0, tmm1, tmm7"),
            (TileSlot::T0, TileSlot::T2, TileSlot::T1) => tdp_asm!($insn, "tmm0, tmm2, tmm1"),
            (TileSlot::T0, TileSlot::T2, TileSlot::T3) => tdp_asm!($insn, "tmm0, tmm2, tmm3"),
            (TileSlot::T0, TileSlot::T2, TileSlot::T4) => tdp_asm!($insn, "tmm0, tmm2, tmm4"),
            (TileSlot::T0, TileSlot::T2, TileSlot::T5) => tdp_asm!($insn, "tmm0, tmm2, tmm5"),
            (TileSlot::T0, TileSlot::T2, TileSlot::T6) => tdp_asm!($insn, "tmm0, tmm2, tmm6"),
            (TileSlot::T0, TileSlot::T2, TileSlot::T7) => tdp_asm!($insn, "tmm0, tmm2, tmm7"),
            (TileSlot::T0, TileSlot::T3, TileSlot::T1) => tdp_asm!($insn, "tmm0, tmm3, tmm1"),
            (TileSlot::T0, TileSlot::T3, TileSlot::T2) => tdp_asm!($insn, "tmm0, tmm3, tmm2"),
            (TileSlot::T0, TileSlot::T3, TileSlot::T4) => tdp_asm!($insn, "tmm0, tmm3, tmm4"),
            (TileSlot::T0, TileSlot::T3, TileSlot::T5) => tdp_asm!($insn, "tmm0, tmm3, tmm5"),
            (TileSlot::T0, TileSlot::T3, TileSlot::T6) => tdp_asm!($insn, "tmm0, tmm3, tmm6"),
            (TileSlot::T0, TileSlot::T3, TileSlot::T7) => tdp_asm!($insn, "tmm0, tmm3, tmm7"),
            (TileSlot::T0, TileSlot::T4, TileSlot::T1) => tdp_asm!($insn, "tmm0, tmm4, tmm1"),
            (TileSlot::T0, TileSlot::T4, TileSlot::T2) => tdp_asm!($insn, "tmm0, tmm4, tmm2"),
            (TileSlot::T0, TileSlot::T4, TileSlot::T3) => tdp_asm!($insn, "tmm0, tmm4, tmm3"),
            (TileSlot::T0, TileSlot::T4, TileSlot::T5) => tdp_asm!($insn, "tmm0, tmm4, tmm5"),
            (TileSlot::T0, TileSlot::T4, TileSlot::T6) => tdp_asm!($insn, "tmm0, tmm4, tmm6"),
            (TileSlot::T0, TileSlot::T4, TileSlot::T7) => tdp_asm!($insn, "tmm0, tmm4, tmm7"),
            (TileSlot::T0, TileSlot::T5, TileSlot::T1) => tdp_asm!($insn, "tmm0, tmm5, tmm1"),
            (TileSlot::T0, TileSlot::T5, TileSlot::T2) => tdp_asm!($insn, "tmm0, tmm5, tmm2"),
            (TileSlot::T0, TileSlot::T5, TileSlot::T3) => tdp_asm!($insn, "tmm0, tmm5, tmm3"),
            (TileSlot::T0, TileSlot::T5, TileSlot::T4) => tdp_asm!($insn, "tmm0, tmm5, tmm4"),
            (TileSlot::T0, TileSlot::T5, TileSlot::T6) => tdp_asm!($insn, "tmm0, tmm5, tmm6"),
            (TileSlot::T0, TileSlot::T5, TileSlot::T7) => tdp_asm!($insn, "tmm0, tmm5, tmm7"),
            (TileSlot::T0, TileSlot::T6, TileSlot::T1) => tdp_asm!($insn, "tmm0, tmm6, tmm1"),
            (TileSlot::T0, TileSlot::T6, TileSlot::T2) => tdp_asm!($insn, "tmm0, tmm6, tmm2"),
            (TileSlot::T0, TileSlot::T6, TileSlot::T3) => tdp_asm!($insn, "tmm0, tmm6, tmm3"),
            (TileSlot::T0, TileSlot::T6, TileSlot::T4) => tdp_asm!($insn, "tmm0, tmm6, tmm4"),
            (TileSlot::T0, TileSlot::T6, TileSlot::T5) => tdp_asm!($insn, "tmm0, tmm6, tmm5"),
            (TileSlot::T0, TileSlot::T6, TileSlot::T7) => tdp_asm!($insn, "tmm0, tmm6, tmm7"),
            (TileSlot::T0, TileSlot::T7, TileSlot::T1) => tdp_asm!($insn, "tmm0, tmm7, tmm1"),
            (TileSlot::T0, TileSlot::T7, TileSlot::T2) => tdp_asm!($insn, "tmm0, tmm7, tmm2"),
            (TileSlot::T0, TileSlot::T7, TileSlot::T3) => tdp_asm!($insn, "tmm0, tmm7, tmm3"),
            (TileSlot::T0, TileSlot::T7, TileSlot::T4) => tdp_asm!($insn, "tmm0, tmm7, tmm4"),
            (TileSlot::T0, TileSlot::T7, TileSlot::T5) => tdp_asm!($insn, "tmm0, tmm7, tmm5"),
            (TileSlot::T0, TileSlot::T7, TileSlot::T6) => tdp_asm!($insn, "tmm0, tmm7, tmm6"),
            (TileSlot::T1, TileSlot::T0, TileSlot::T2) => tdp_asm!($insn, "tmm1, tmm0, tmm2"),
            (TileSlot::T1, TileSlot::T0, TileSlot::T3) => tdp_asm!($insn, "tmm1, tmm0, tmm3"),
            (TileSlot::T1, TileSlot::T0, TileSlot::T4) => tdp_asm!($insn, "tmm1, tmm0, tmm4"),
            (TileSlot::T1, TileSlot::T0, TileSlot::T5) => tdp_asm!($insn, "tmm1, tmm0, tmm5"),
            (TileSlot::T1, TileSlot::T0, TileSlot::T6) => tdp_asm!($insn, "tmm1, tmm0, tmm6"),
            (TileSlot::T1, TileSlot::T0, TileSlot::T7) => tdp_asm!($insn, "tmm1, tmm0, tmm7"),
            (TileSlot::T1, TileSlot::T2, TileSlot::T0) => tdp_asm!($insn, "tmm1, tmm2, tmm0"),
            (TileSlot::T1, TileSlot::T2, TileSlot::T3) => tdp_asm!($insn, "tmm1, tmm2, tmm3"),
            (TileSlot::T1, TileSlot::T2, TileSlot::T4) => tdp_asm!($insn, "tmm1, tmm2, tmm4"),
            (TileSlot::T1, TileSlot::T2, TileSlot::T5) => tdp_asm!($insn, "tmm1, tmm2, tmm5"),
            (TileSlot::T1, TileSlot::T2, TileSlot::T6) => tdp_asm!($insn, "tmm1, tmm2, tmm6"),
            (TileSlot::T1, TileSlot::T2, TileSlot::T7) => tdp_asm!($insn, "tmm1, tmm2, tmm7"),
            (TileSlot::T1, TileSlot::T3, TileSlot::T0) => tdp_asm!($insn, "tmm1, tmm3, tmm0"),
            (TileSlot::T1, TileSlot::T3, TileSlot::T2) => tdp_asm!($insn, "tmm1, tmm3, tmm2"),
            (TileSlot::T1, TileSlot::T3, TileSlot::T4) => tdp_asm!($insn, "tmm1, tmm3, tmm4"),
            (TileSlot::T1, TileSlot::T3, TileSlot::T5) => tdp_asm!($insn, "tmm1, tmm3, tmm5"),
            (TileSlot::T1, TileSlot::T3, TileSlot::T6) => tdp_asm!($insn, "tmm1, tmm3, tmm6"),
            (TileSlot::T1, TileSlot::T3, TileSlot::T7) => tdp_asm!($insn, "tmm1, tmm3, tmm7"),
            (TileSlot::T1, TileSlot::T4, TileSlot::T0) => tdp_asm!($insn, "tmm1, tmm4, tmm0"),
            (TileSlot::T1, TileSlot::T4, TileSlot::T2) => tdp_asm!($insn, "tmm1, tmm4, tmm2"),
            (TileSlot::T1, TileSlot::T4, TileSlot::T3) => tdp_asm!($insn, "tmm1, tmm4, tmm3"),
            (TileSlot::T1, TileSlot::T4, TileSlot::T5) => tdp_asm!($insn, "tmm1, tmm4, tmm5"),
            (TileSlot::T1, TileSlot::T4, TileSlot::T6) => tdp_asm!($insn, "tmm1, tmm4, tmm6"),
            (TileSlot::T1, TileSlot::T4, TileSlot::T7) => tdp_asm!($insn, "tmm1, tmm4, tmm7"),
            (TileSlot::T1, TileSlot::T5, TileSlot::T0) => tdp_asm!($insn, "tmm1, tmm5, tmm0"),
            (TileSlot::T1, TileSlot::T5, TileSlot::T2) => tdp_asm!($insn, "tmm1, tmm5, tmm2"),
            (TileSlot::T1, TileSlot::T5, TileSlot::T3) => tdp_asm!($insn, "tmm1, tmm5, tmm3"),
            (TileSlot::T1, TileSlot::T5, TileSlot::T4) => tdp_asm!($insn, "tmm1, tmm5, tmm4"),
            (TileSlot::T1, TileSlot::T5, TileSlot::T6) => tdp_asm!($insn, "tmm1, tmm5, tmm6"),
            (TileSlot::T1, TileSlot::T5, TileSlot::T7) => tdp_asm!($insn, "tmm1, tmm5, tmm7"),
            (TileSlot::T1, TileSlot::T6, TileSlot::T0) => tdp_asm!($insn, "tmm1, tmm6, tmm0"),
            (TileSlot::T1, TileSlot::T6, TileSlot::T2) => tdp_asm!($insn, "tmm1, tmm6, tmm2"),
            (TileSlot::T1, TileSlot::T6, TileSlot::T3) => tdp_asm!($insn, "tmm1, tmm6, tmm3"),
            (TileSlot::T1, TileSlot::T6, TileSlot::T4) => tdp_asm!($insn, "tmm1, tmm6, tmm4"),
            (TileSlot::T1, TileSlot::T6, TileSlot::T5) => tdp_asm!($insn, "tmm1, tmm6, tmm5"),
            (TileSlot::T1, TileSlot::T6, TileSlot::T7) => tdp_asm!($insn, "tmm1, tmm6, tmm7"),
            (TileSlot::T1, TileSlot::T7, TileSlot::T0) => tdp_asm!($insn, "tmm1, tmm7, tmm0"),
            (TileSlot::T1, TileSlot::T7, TileSlot::T2) => tdp_asm!($insn, "tmm1, tmm7, tmm2"),
            (TileSlot::T1, TileSlot::T7, TileSlot::T3) => tdp_asm!($insn, "tmm1, tmm7, tmm3"),
            (TileSlot::T1, TileSlot::T7, TileSlot::T4) => tdp_asm!($insn, "tmm1, tmm7, tmm4"),
            (TileSlot::T1, TileSlot::T7, TileSlot::T5) => tdp_asm!($insn, "tmm1, tmm7, tmm5"),
            (TileSlot::T1, TileSlot::T7, TileSlot::T6) => tdp_asm!($insn, "tmm1, tmm7, tmm6"),
            (TileSlot::T2, TileSlot::T0, TileSlot::T1) => tdp_asm!($insn, "tmm2, tmm0, tmm1"),
            (TileSlot::T2, TileSlot::T0, TileSlot::T3) => tdp_asm!($insn, "tmm2, tmm0, tmm3"),
            (TileSlot::T2, TileSlot::T0, TileSlot::T4) => tdp_asm!($insn, "tmm2, tmm0, tmm4"),
            (TileSlot::T2, TileSlot::T0, TileSlot::T5) => tdp_asm!($insn, "tmm2, tmm0, tmm5"),
            (TileSlot::T2, TileSlot::T0, TileSlot::T6) => tdp_asm!($insn, "tmm2, tmm0, tmm6"),
            (TileSlot::T2, TileSlot::T0, TileSlot::T7) => tdp_asm!($insn, "tmm2, tmm0, tmm7"),
            (TileSlot::T2, TileSlot::T1, TileSlot::T0) => tdp_asm!($insn, "tmm2, tmm1, tmm0"),
            (TileSlot::T2, TileSlot::T1, TileSlot::T3) => tdp_asm!($insn, "tmm2, tmm1, tmm3"),
            (TileSlot::T2, TileSlot::T1, TileSlot::T4) => tdp_asm!($insn, "tmm2, tmm1, tmm4"),
            (TileSlot::T2, TileSlot::T1, TileSlot::T5) => tdp_asm!($insn, "tmm2, tmm1, tmm5"),
            (TileSlot::T2, TileSlot::T1, TileSlot::T6) => tdp_asm!($insn, "tmm2, tmm1, tmm6"),
            (TileSlot::T2, TileSlot::T1, TileSlot::T7) => tdp_asm!($insn, "tmm2, tmm1, tmm7"),
            (TileSlot::T2, TileSlot::T3, TileSlot::T0) => tdp_asm!($insn, "tmm2, tmm3, tmm0"),
            (TileSlot::T2, TileSlot::T3, TileSlot::T1) => tdp_asm!($insn, "tmm2, tmm3, tmm1"),
            (TileSlot::T2, TileSlot::T3, TileSlot::T4) => tdp_asm!($insn, "tmm2, tmm3, tmm4"),
            (TileSlot::T2, TileSlot::T3, TileSlot::T5) => tdp_asm!($insn, "tmm2, tmm3, tmm5"),
            (TileSlot::T2, TileSlot::T3, TileSlot::T6) => tdp_asm!($insn, "tmm2, tmm3, tmm6"),
            (TileSlot::T2, TileSlot::T3, TileSlot::T7) => tdp_asm!($insn, "tmm2, tmm3, tmm7"),
            (TileSlot::T2, TileSlot::T4, TileSlot::T0) => tdp_asm!($insn, "tmm2, tmm4, tmm0"),
            (TileSlot::T2, TileSlot::T4, TileSlot::T1) => tdp_asm!($insn, "tmm2, tmm4, tmm1"),
            (TileSlot::T2, TileSlot::T4, TileSlot::T3) => tdp_asm!($insn, "tmm2, tmm4, tmm3"),
            (TileSlot::T2, TileSlot::T4, TileSlot::T5) => tdp_asm!($insn, "tmm2, tmm4, tmm5"),
            (TileSlot::T2, TileSlot::T4, TileSlot::T6) => tdp_asm!($insn, "tmm2, tmm4, tmm6"),
            (TileSlot::T2, TileSlot::T4, TileSlot::T7) => tdp_asm!($insn, "tmm2, tmm4, tmm7"),
            (TileSlot::T2, TileSlot::T5, TileSlot::T0) => tdp_asm!($insn, "tmm2, tmm5, tmm0"),
            (TileSlot::T2, TileSlot::T5, TileSlot::T1) => tdp_asm!($insn, "tmm2, tmm5, tmm1"),
            (TileSlot::T2, TileSlot::T5, TileSlot::T3) => tdp_asm!($insn, "tmm2, tmm5, tmm3"),
            (TileSlot::T2, TileSlot::T5, TileSlot::T4) => tdp_asm!($insn, "tmm2, tmm5, tmm4"),
            (TileSlot::T2, TileSlot::T5, TileSlot::T6) => tdp_asm!($insn, "tmm2, tmm5, tmm6"),
            (TileSlot::T2, TileSlot::T5, TileSlot::T7) => tdp_asm!($insn, "tmm2, tmm5, tmm7"),
            (TileSlot::T2, TileSlot::T6, TileSlot::T0) => tdp_asm!($insn, "tmm2, tmm6, tmm0"),
            (TileSlot::T2, TileSlot::T6, TileSlot::T1) => tdp_asm!($insn, "tmm2, tmm6, tmm1"),
            (TileSlot::T2, TileSlot::T6, TileSlot::T3) => tdp_asm!($insn, "tmm2, tmm6, tmm3"),
            (TileSlot::T2, TileSlot::T6, TileSlot::T4) => tdp_asm!($insn, "tmm2, tmm6, tmm4"),
            (TileSlot::T2, TileSlot::T6, TileSlot::T5) => tdp_asm!($insn, "tmm2, tmm6, tmm5"),
            (TileSlot::T2, TileSlot::T6, TileSlot::T7) => tdp_asm!($insn, "tmm2, tmm6, tmm7"),
            (TileSlot::T2, TileSlot::T7, TileSlot::T0) => tdp_asm!($insn, "tmm2, tmm7, tmm0"),
            (TileSlot::T2, TileSlot::T7, TileSlot::T1) => tdp_asm!($insn, "tmm2, tmm7, tmm1"),
            (TileSlot::T2, TileSlot::T7, TileSlot::T3) => tdp_asm!($insn, "tmm2, tmm7, tmm3"),
            (TileSlot::T2, TileSlot::T7, TileSlot::T4) => tdp_asm!($insn, "tmm2, tmm7, tmm4"),
            (TileSlot::T2, TileSlot::T7, TileSlot::T5) => tdp_asm!($insn, "tmm2, tmm7, tmm5"),
            (TileSlot::T2, TileSlot::T7, TileSlot::T6) => tdp_asm!($insn, "tmm2, tmm7, tmm6"),
            (TileSlot::T3, TileSlot::T0, TileSlot::T1) => tdp_asm!($insn, "tmm3, tmm0, tmm1"),
            (TileSlot::T3, TileSlot::T0, TileSlot::T2) => tdp_asm!($insn, "tmm3, tmm0, tmm2"),
            (TileSlot::T3, TileSlot::T0, TileSlot::T4) => tdp_asm!($insn, "tmm3, tmm0, tmm4"),
            (TileSlot::T3, TileSlot::T0, TileSlot::T5) => tdp_asm!($insn, "tmm3, tmm0, tmm5"),
            (TileSlot::T3, TileSlot::T0, TileSlot::T6) => tdp_asm!($insn, "tmm3, tmm0, tmm6"),
            (TileSlot::T3, TileSlot::T0, TileSlot::T7) => tdp_asm!($insn, "tmm3, tmm0, tmm7"),
            (TileSlot::T3, TileSlot::T1, TileSlot::T0) => tdp_asm!($insn, "tmm3, tmm1, tmm0"),
            (TileSlot::T3, TileSlot::T1, TileSlot::T2) => tdp_asm!($insn, "tmm3, tmm1, tmm2"),
            (TileSlot::T3, TileSlot::T1, TileSlot::T4) => tdp_asm!($insn, "tmm3, tmm1, tmm4"),
            (TileSlot::T3, TileSlot::T1, TileSlot::T5) => tdp_asm!($insn, "tmm3, tmm1, tmm5"),
            (TileSlot::T3, TileSlot::T1, TileSlot::T6) => tdp_asm!($insn, "tmm3, tmm1, tmm6"),
            (TileSlot::T3, TileSlot::T1, TileSlot::T7) => tdp_asm!($insn, "tmm3, tmm1, tmm7"),
            (TileSlot::T3, TileSlot::T2, TileSlot::T0) => tdp_asm!($insn, "tmm3, tmm2, tmm0"),
            (TileSlot::T3, TileSlot::T2, TileSlot::T1) => tdp_asm!($insn, "tmm3, tmm2, tmm1"),
            (TileSlot::T3, TileSlot::T2, TileSlot::T4) => tdp_asm!($insn, "tmm3, tmm2, tmm4"),
            (TileSlot::T3, TileSlot::T2, TileSlot::T5) => tdp_asm!($insn, "tmm3, tmm2, tmm5"),
            (TileSlot::T3, TileSlot::T2, TileSlot::T6) => tdp_asm!($insn, "tmm3, tmm2, tmm6"),
            (TileSlot::T3, TileSlot::T2, TileSlot::T7) => tdp_asm!($insn, "tmm3, tmm2, tmm7"),
            (TileSlot::T3, TileSlot::T4, TileSlot::T0) => tdp_asm!($insn, "tmm3, tmm4, tmm0"),
            (TileSlot::T3, TileSlot::T4, TileSlot::T1) => tdp_asm!($insn, "tmm3, tmm4, tmm1"),
            (TileSlot::T3, TileSlot::T4, TileSlot::T2) => tdp_asm!($insn, "tmm3, tmm4, tmm2"),
            (TileSlot::T3, TileSlot::T4, TileSlot::T5) => tdp_asm!($insn, "tmm3, tmm4, tmm5"),
            (TileSlot::T3, TileSlot::T4, TileSlot::T6) => tdp_asm!($insn, "tmm3, tmm4, tmm6"),
            (TileSlot::T3, TileSlot::T4, TileSlot::T7) => tdp_asm!($insn, "tmm3, tmm4, tmm7"),
            (TileSlot::T3, TileSlot::T5, TileSlot::T0) => tdp_asm!($insn, "tmm3, tmm5, tmm0"),
            (TileSlot::T3, TileSlot::T5, TileSlot::T1) => tdp_asm!($insn, "tmm3, tmm5, tmm1"),
            (TileSlot::T3, TileSlot::T5, TileSlot::T2) => tdp_asm!($insn, "tmm3, tmm5, tmm2"),
            (TileSlot::T3, TileSlot::T5, TileSlot::T4) => tdp_asm!($insn, "tmm3, tmm5, tmm4"),
            (TileSlot::T3, TileSlot::T5, TileSlot::T6) => tdp_asm!($insn, "tmm3, tmm5, tmm6"),
            (TileSlot::T3, TileSlot::T5, TileSlot::T7) => tdp_asm!($insn, "tmm3, tmm5, tmm7"),
            (TileSlot::T3, TileSlot::T6, TileSlot::T0) => tdp_asm!($insn, "tmm3, tmm6, tmm0"),
            (TileSlot::T3, TileSlot::T6, TileSlot::T1) => tdp_asm!($insn, "tmm3, tmm6, tmm1"),
            (TileSlot::T3, TileSlot::T6, TileSlot::T2) => tdp_asm!($insn, "tmm3, tmm6, tmm2"),
            (TileSlot::T3, TileSlot::T6, TileSlot::T4) => tdp_asm!($insn, "tmm3, tmm6, tmm4"),
            (TileSlot::T3, TileSlot::T6, TileSlot::T5) => tdp_asm!($insn, "tmm3, tmm6, tmm5"),
            (TileSlot::T3, TileSlot::T6, TileSlot::T7) => tdp_asm!($insn, "tmm3, tmm6, tmm7"),
            (TileSlot::T3, TileSlot::T7, TileSlot::T0) => tdp_asm!($insn, "tmm3, tmm7, tmm0"),
            (TileSlot::T3, TileSlot::T7, TileSlot::T1) => tdp_asm!($insn, "tmm3, tmm7, tmm1"),
            (TileSlot::T3, TileSlot::T7, TileSlot::T2) => tdp_asm!($insn, "tmm3, tmm7, tmm2"),
            (TileSlot::T3, TileSlot::T7, TileSlot::T4) => tdp_asm!($insn, "tmm3, tmm7, tmm4"),
            (TileSlot::T3, TileSlot::T7, TileSlot::T5) => tdp_asm!($insn, "tmm3, tmm7, tmm5"),
            (TileSlot::T3, TileSlot::T7, TileSlot::T6) => tdp_asm!($insn, "tmm3, tmm7, tmm6"),
            (TileSlot::T4, TileSlot::T0, TileSlot::T1) => tdp_asm!($insn, "tmm4, tmm0, tmm1"),
            (TileSlot::T4, TileSlot::T0, TileSlot::T2) => tdp_asm!($insn, "tmm4, tmm0, tmm2"),
            (TileSlot::T4, TileSlot::T0, TileSlot::T3) => tdp_asm!($insn, "tmm4, tmm0, tmm3"),
            (TileSlot::T4, TileSlot::T0, TileSlot::T5) => tdp_asm!($insn, "tmm4, tmm0, tmm5"),
            (TileSlot::T4, TileSlot::T0, TileSlot::T6) => tdp_asm!($insn, "tmm4, tmm0, tmm6"),
            (TileSlot::T4, TileSlot::T0, TileSlot::T7) => tdp_asm!($insn, "tmm4, tmm0, tmm7"),
            (TileSlot::T4, TileSlot::T1, TileSlot::T0) => tdp_asm!($insn, "tmm4, tmm1, tmm0"),
            (TileSlot::T4, TileSlot::T1, TileSlot::T2) => tdp_asm!($insn, "tmm4, tmm1, tmm2"),
            (TileSlot::T4, TileSlot::T1, TileSlot::T3) => tdp_asm!($insn, "tmm4, tmm1, tmm3"),
            (TileSlot::T4, TileSlot::T1, TileSlot::T5) => tdp_asm!($insn, "tmm4, tmm1, tmm5"),
            (TileSlot::T4, TileSlot::T1, TileSlot::T6) => tdp_asm!($insn, "tmm4, tmm1, tmm6"),
            (TileSlot::T4, TileSlot::T1, TileSlot::T7) => tdp_asm!($insn, "tmm4, tmm1, tmm7"),
            (TileSlot::T4, TileSlot::T2, TileSlot::T0) => tdp_asm!($insn, "tmm4, tmm2, tmm0"),
            (TileSlot::T4, TileSlot::T2, TileSlot::T1) => tdp_asm!($insn, "tmm4, tmm2, tmm1"),
            (TileSlot::T4, TileSlot::T2, TileSlot::T3) => tdp_asm!($insn, "tmm4, tmm2, tmm3"),
            (TileSlot::T4, TileSlot::T2, TileSlot::T5) => tdp_asm!($insn, "tmm4, tmm2, tmm5"),
            (TileSlot::T4, TileSlot::T2, TileSlot::T6) => tdp_asm!($insn, "tmm4, tmm2, tmm6"),
            (TileSlot::T4, TileSlot::T2, TileSlot::T7) => tdp_asm!($insn, "tmm4, tmm2, tmm7"),
            (TileSlot::T4, TileSlot::T3, TileSlot::T0) => tdp_asm!($insn, "tmm4, tmm3, tmm0"),
            (TileSlot::T4, TileSlot::T3, TileSlot::T1) => tdp_asm!($insn, "tmm4, tmm3, tmm1"),
            (TileSlot::T4, TileSlot::T3, TileSlot::T2) => tdp_asm!($insn, "tmm4, tmm3, tmm2"),
            (TileSlot::T4, TileSlot::T3, TileSlot::T5) => tdp_asm!($insn, "tmm4, tmm3, tmm5"),
            (TileSlot::T4, TileSlot::T3, TileSlot::T6) => tdp_asm!($insn, "tmm4, tmm3, tmm6"),
            (TileSlot::T4, TileSlot::T3, TileSlot::T7) => tdp_asm!($insn, "tmm4, tmm3, tmm7"),
            (TileSlot::T4, TileSlot::T5, TileSlot::T0) => tdp_asm!($insn, "tmm4, tmm5, tmm0"),
            (TileSlot::T4, TileSlot::T5, TileSlot::T1) => tdp_asm!($insn, "tmm4, tmm5, tmm1"),
            (TileSlot::T4, TileSlot::T5, TileSlot::T2) => tdp_asm!($insn, "tmm4, tmm5, tmm2"),
            (TileSlot::T4, TileSlot::T5, TileSlot::T3) => tdp_asm!($insn, "tmm4, tmm5, tmm3"),
            (TileSlot::T4, TileSlot::T5, TileSlot::T6) => tdp_asm!($insn, "tmm4, tmm5, tmm6"),
            (TileSlot::T4, TileSlot::T5, TileSlot::T7) => tdp_asm!($insn, "tmm4, tmm5, tmm7"),
            (TileSlot::T4, TileSlot::T6, TileSlot::T0) => tdp_asm!($insn, "tmm4, tmm6, tmm0"),
            (TileSlot::T4, TileSlot::T6, TileSlot::T1) => tdp_asm!($insn, "tmm4, tmm6, tmm1"),
            (TileSlot::T4, TileSlot::T6, TileSlot::T2) => tdp_asm!($insn, "tmm4, tmm6, tmm2"),
            (TileSlot::T4, TileSlot::T6, TileSlot::T3) => tdp_asm!($insn, "tmm4, tmm6, tmm3"),
            (TileSlot::T4, TileSlot::T6, TileSlot::T5) => tdp_asm!($insn, "tmm4, tmm6, tmm5"),
            (TileSlot::T4, TileSlot::T6, TileSlot::T7) => tdp_asm!($insn, "tmm4, tmm6, tmm7"),
            (TileSlot::T4, TileSlot::T7, TileSlot::T0) => tdp_asm!($insn, "tmm4, tmm7, tmm0"),
            (TileSlot::T4, TileSlot::T7, TileSlot::T1) => tdp_asm!($insn, "tmm4, tmm7, tmm1"),
            (TileSlot::T4, TileSlot::T7, TileSlot::T2) => tdp_asm!($insn, "tmm4, tmm7, tmm2"),
            (TileSlot::T4, TileSlot::T7, TileSlot::T3) => tdp_asm!($insn, "tmm4, tmm7, tmm3"),
            (TileSlot::T4, TileSlot::T7, TileSlot::T5) => tdp_asm!($insn, "tmm4, tmm7, tmm5"),
            (TileSlot::T4, TileSlot::T7, TileSlot::T6) => tdp_asm!($insn, "tmm4, tmm7, tmm6"),
            (TileSlot::T5, TileSlot::T0, TileSlot::T1) => tdp_asm!($insn, "tmm5, tmm0, tmm1"),
            (TileSlot::T5, TileSlot::T0, TileSlot::T2) => tdp_asm!($insn, "tmm5, tmm0, tmm2"),
            (TileSlot::T5, TileSlot::T0, TileSlot::T3) => tdp_asm!($insn, "tmm5, tmm0, tmm3"),
            (TileSlot::T5, TileSlot::T0, TileSlot::T4) => tdp_asm!($insn, "tmm5, tmm0, tmm4"),
            (TileSlot::T5, TileSlot::T0, TileSlot::T6) => tdp_asm!($insn, "tmm5, tmm0, tmm6"),
            (TileSlot::T5, TileSlot::T0, TileSlot::T7) => tdp_asm!($insn, "tmm5, tmm0, tmm7"),
            (TileSlot::T5, TileSlot::T1, TileSlot::T0) => tdp_asm!($insn, "tmm5, tmm1, tmm0"),
            (TileSlot::T5, TileSlot::T1, TileSlot::T2) => tdp_asm!($insn, "tmm5, tmm1, tmm2"),
            (TileSlot::T5, TileSlot::T1, TileSlot::T3) => tdp_asm!($insn, "tmm5, tmm1, tmm3"),
            (TileSlot::T5, TileSlot::T1, TileSlot::T4) => tdp_asm!($insn, "tmm5, tmm1, tmm4"),
            (TileSlot::T5, TileSlot::T1, TileSlot::T6) => tdp_asm!($insn, "tmm5, tmm1, tmm6"),
            (TileSlot::T5, TileSlot::T1, TileSlot::T7) => tdp_asm!($insn, "tmm5, tmm1, tmm7"),
            (TileSlot::T5, TileSlot::T2, TileSlot::T0) => tdp_asm!($insn, "tmm5, tmm2, tmm0"),
            (TileSlot::T5, TileSlot::T2, TileSlot::T1) => tdp_asm!($insn, "tmm5, tmm2, tmm1"),
            (TileSlot::T5, TileSlot::T2, TileSlot::T3) => tdp_asm!($insn, "tmm5, tmm2, tmm3"),
            (TileSlot::T5, TileSlot::T2, TileSlot::T4) => tdp_asm!($insn, "tmm5, tmm2, tmm4"),
            (TileSlot::T5, TileSlot::T2, TileSlot::T6) => tdp_asm!($insn, "tmm5, tmm2, tmm6"),
            (TileSlot::T5, TileSlot::T2, TileSlot::T7) => tdp_asm!($insn, "tmm5, tmm2, tmm7"),
            (TileSlot::T5, TileSlot::T3, TileSlot::T0) => tdp_asm!($insn, "tmm5, tmm3, tmm0"),
            (TileSlot::T5, TileSlot::T3, TileSlot::T1) => tdp_asm!($insn, "tmm5, tmm3, tmm1"),
            (TileSlot::T5, TileSlot::T3, TileSlot::T2) => tdp_asm!($insn, "tmm5, tmm3, tmm2"),
            (TileSlot::T5, TileSlot::T3, TileSlot::T4) => tdp_asm!($insn, "tmm5, tmm3, tmm4"),
            (TileSlot::T5, TileSlot::T3, TileSlot::T6) => tdp_asm!($insn, "tmm5, tmm3, tmm6"),
            (TileSlot::T5, TileSlot::T3, TileSlot::T7) => tdp_asm!($insn, "tmm5, tmm3, tmm7"),
            (TileSlot::T5, TileSlot::T4, TileSlot::T0) => tdp_asm!($insn, "tmm5, tmm4, tmm0"),
            (TileSlot::T5, TileSlot::T4, TileSlot::T1) => tdp_asm!($insn, "tmm5, tmm4, tmm1"),
            (TileSlot::T5, TileSlot::T4, TileSlot::T2) => tdp_asm!($insn, "tmm5, tmm4, tmm2"),
            (TileSlot::T5, TileSlot::T4, TileSlot::T3) => tdp_asm!($insn, "tmm5, tmm4, tmm3"),
            (TileSlot::T5, TileSlot::T4, TileSlot::T6) => tdp_asm!($insn, "tmm5, tmm4, tmm6"),
            (TileSlot::T5, TileSlot::T4, TileSlot::T7) => tdp_asm!($insn, "tmm5, tmm4, tmm7"),
            (TileSlot::T5, TileSlot::T6, TileSlot::T0) => tdp_asm!($insn, "tmm5, tmm6, tmm0"),
            (TileSlot::T5, TileSlot::T6, TileSlot::T1) => tdp_asm!($insn, "tmm5, tmm6, tmm1"),
            (TileSlot::T5, TileSlot::T6, TileSlot::T2) => tdp_asm!($insn, "tmm5, tmm6, tmm2"),
            (TileSlot::T5, TileSlot::T6, TileSlot::T3) => tdp_asm!($insn, "tmm5, tmm6, tmm3"),
            (TileSlot::T5, TileSlot::T6, TileSlot::T4) => tdp_asm!($insn, "tmm5, tmm6, tmm4"),
            (TileSlot::T5, TileSlot::T6, TileSlot::T7) => tdp_asm!($insn, "tmm5, tmm6, tmm7"),
            (TileSlot::T5, TileSlot::T7, TileSlot::T0) => tdp_asm!($insn, "tmm5, tmm7, tmm0"),
            (TileSlot::T5, TileSlot::T7, TileSlot::T1) => tdp_asm!($insn, "tmm5, tmm7, tmm1"),
            (TileSlot::T5, TileSlot::T7, TileSlot::T2) => tdp_asm!($insn, "tmm5, tmm7, tmm2"),
            (TileSlot::T5, TileSlot::T7, TileSlot::T3) => tdp_asm!($insn, "tmm5, tmm7, tmm3"),
            (TileSlot::T5, TileSlot::T7, TileSlot::T4) => tdp_asm!($insn, "tmm5, tmm7, tmm4"),
            (TileSlot::T5, TileSlot::T7, TileSlot::T6) => tdp_asm!($insn, "tmm5, tmm7, tmm6"),
            (TileSlot::T6, TileSlot::T0, TileSlot::T1) => tdp_asm!($insn, "tmm6, tmm0, tmm1"),
            (TileSlot::T6, TileSlot::T0, TileSlot::T2) => tdp_asm!($insn, "tmm6, tmm0, tmm2"),
            (TileSlot::T6, TileSlot::T0, TileSlot::T3) => tdp_asm!($insn, "tmm6, tmm0, tmm3"),
            (TileSlot::T6, TileSlot::T0, TileSlot::T4) => tdp_asm!($insn, "tmm6, tmm0, tmm4"),
            (TileSlot::T6, TileSlot::T0, TileSlot::T5) => tdp_asm!($insn, "tmm6, tmm0, tmm5"),
            (TileSlot::T6, TileSlot::T0, TileSlot::T7) => tdp_asm!($insn, "tmm6, tmm0, tmm7"),
            (TileSlot::T6, TileSlot::T1, TileSlot::T0) => tdp_asm!($insn, "tmm6, tmm1, tmm0"),
            (TileSlot::T6, TileSlot::T1, TileSlot::T2) => tdp_asm!($insn, "tmm6, tmm1, tmm2"),
            (TileSlot::T6, TileSlot::T1, TileSlot::T3) => tdp_asm!($insn, "tmm6, tmm1, tmm3"),
            (TileSlot::T6, TileSlot::T1, TileSlot::T4) => tdp_asm!($insn, "tmm6, tmm1, tmm4"),
            (TileSlot::T6, TileSlot::T1, TileSlot::T5) => tdp_asm!($insn, "tmm6, tmm1, tmm5"),
            (TileSlot::T6, TileSlot::T1, TileSlot::T7) => tdp_asm!($insn, "tmm6, tmm1, tmm7"),
            (TileSlot::T6, TileSlot::T2, TileSlot::T0) => tdp_asm!($insn, "tmm6, tmm2, tmm0"),
            (TileSlot::T6, TileSlot::T2, TileSlot::T1) => tdp_asm!($insn, "tmm6, tmm2, tmm1"),
            (TileSlot::T6, TileSlot::T2, TileSlot::T3) => tdp_asm!($insn, "tmm6, tmm2, tmm3"),
            (TileSlot::T6, TileSlot::T2, TileSlot::T4) => tdp_asm!($insn, "tmm6, tmm2, tmm4"),
            (TileSlot::T6, TileSlot::T2, TileSlot::T5) => tdp_asm!($insn, "tmm6, tmm2, tmm5"),
            (TileSlot::T6, TileSlot::T2, TileSlot::T7) => tdp_asm!($insn, "tmm6, tmm2, tmm7"),
            (TileSlot::T6, TileSlot::T3, TileSlot::T0) => tdp_asm!($insn, "tmm6, tmm3, tmm0"),
            (TileSlot::T6, TileSlot::T3, TileSlot::T1) => tdp_asm!($insn, "tmm6, tmm3, tmm1"),
            (TileSlot::T6, TileSlot::T3, TileSlot::T2) => tdp_asm!($insn, "tmm6, tmm3, tmm2"),
            (TileSlot::T6, TileSlot::T3, TileSlot::T4) => tdp_asm!($insn, "tmm6, tmm3, tmm4"),
            (TileSlot::T6, TileSlot::T3, TileSlot::T5) => tdp_asm!($insn, "tmm6, tmm3, tmm5"),
            (TileSlot::T6, TileSlot::T3, TileSlot::T7) => tdp_asm!($insn, "tmm6, tmm3, tmm7"),
            (TileSlot::T6, TileSlot::T4, TileSlot::T0) => tdp_asm!($insn, "tmm6, tmm4, tmm0"),
            (TileSlot::T6, TileSlot::T4, TileSlot::T1) => tdp_asm!($insn, "tmm6, tmm4, tmm1"),
            (TileSlot::T6, TileSlot::T4, TileSlot::T2) => tdp_asm!($insn, "tmm6, tmm4, tmm2"),
            (TileSlot::T6, TileSlot::T4, TileSlot::T3) => tdp_asm!($insn, "tmm6, tmm4, tmm3"),
            (TileSlot::T6, TileSlot::T4, TileSlot::T5) => tdp_asm!($insn, "tmm6, tmm4, tmm5"),
            (TileSlot::T6, TileSlot::T4, TileSlot::T7) => tdp_asm!($insn, "tmm6, tmm4, tmm7"),
            (TileSlot::T6, TileSlot::T5, TileSlot::T0) => tdp_asm!($insn, "tmm6, tmm5, tmm0"),
            (TileSlot::T6, TileSlot::T5, TileSlot::T1) => tdp_asm!($insn, "tmm6, tmm5, tmm1"),
            (TileSlot::T6, TileSlot::T5, TileSlot::T2) => tdp_asm!($insn, "tmm6, tmm5, tmm2"),
            (TileSlot::T6, TileSlot::T5, TileSlot::T3) => tdp_asm!($insn, "tmm6, tmm5, tmm3"),
            (TileSlot::T6, TileSlot::T5, TileSlot::T4) => tdp_asm!($insn, "tmm6, tmm5, tmm4"),
            (TileSlot::T6, TileSlot::T5, TileSlot::T7) => tdp_asm!($insn, "tmm6, tmm5, tmm7"),
            (TileSlot::T6, TileSlot::T7, TileSlot::T0) => tdp_asm!($insn, "tmm6, tmm7, tmm0"),
            (TileSlot::T6, TileSlot::T7, TileSlot::T1) => tdp_asm!($insn, "tmm6, tmm7, tmm1"),
            (TileSlot::T6, TileSlot::T7, TileSlot::T2) => tdp_asm!($insn, "tmm6, tmm7, tmm2"),
            (TileSlot::T6, TileSlot::T7, TileSlot::T3) => tdp_asm!($insn, "tmm6, tmm7, tmm3"),
            (TileSlot::T6, TileSlot::T7, TileSlot::T4) => tdp_asm!($insn, "tmm6, tmm7, tmm4"),
            (TileSlot::T6, TileSlot::T7, TileSlot::T5) => tdp_asm!($insn, "tmm6, tmm7, tmm5"),
            (TileSlot::T7, TileSlot::T0, TileSlot::T1) => tdp_asm!($insn, "tmm7, tmm0, tmm1"),
            (TileSlot::T7, TileSlot::T0, TileSlot::T2) => tdp_asm!($insn, "tmm7, tmm0, tmm2"),
            (TileSlot::T7, TileSlot::T0, TileSlot::T3) => tdp_asm!($insn, "tmm7, tmm0, tmm3"),
            (TileSlot::T7, TileSlot::T0, TileSlot::T4) => tdp_asm!($insn, "tmm7, tmm0, tmm4"),
            (TileSlot::T7, TileSlot::T0, TileSlot::T5) => tdp_asm!($insn, "tmm7, tmm0, tmm5"),
            (TileSlot::T7, TileSlot::T0, TileSlot::T6) => tdp_asm!($insn, "tmm7, tmm0, tmm6"),
            (TileSlot::T7, TileSlot::T1, TileSlot::T0) => tdp_asm!($insn, "tmm7, tmm1, tmm0"),
            (TileSlot::T7, TileSlot::T1, TileSlot::T2) => tdp_asm!($insn, "tmm7, tmm1, tmm2"),
            (TileSlot::T7, TileSlot::T1, TileSlot::T3) => tdp_asm!($insn, "tmm7, tmm1, tmm3"),
            (TileSlot::T7, TileSlot::T1, TileSlot::T4) => tdp_asm!($insn, "tmm7, tmm1, tmm4"),
            (TileSlot::T7, TileSlot::T1, TileSlot::T5) => tdp_asm!($insn, "tmm7, tmm1, tmm5"),
            (TileSlot::T7, TileSlot::T1, TileSlot::T6) => tdp_asm!($insn, "tmm7, tmm1, tmm6"),
            (TileSlot::T7, TileSlot::T2, TileSlot::T0) => tdp_asm!($insn, "tmm7, tmm2, tmm0"),
            (TileSlot::T7, TileSlot::T2, TileSlot::T1) => tdp_asm!($insn, "tmm7, tmm2, tmm1"),
            (TileSlot::T7, TileSlot::T2, TileSlot::T3) => tdp_asm!($insn, "tmm7, tmm2, tmm3"),
            (TileSlot::T7, TileSlot::T2, TileSlot::T4) => tdp_asm!($insn, "tmm7, tmm2, tmm4"),
            (TileSlot::T7, TileSlot::T2, TileSlot::T5) => tdp_asm!($insn, "tmm7, tmm2, tmm5"),
            (TileSlot::T7, TileSlot::T2, TileSlot::T6) => tdp_asm!($insn, "tmm7, tmm2, tmm6"),
            (TileSlot::T7, TileSlot::T3, TileSlot::T0) => tdp_asm!($insn, "tmm7, tmm3, tmm0"),
            (TileSlot::T7, TileSlot::T3, TileSlot::T1) => tdp_asm!($insn, "tmm7, tmm3, tmm1"),
            (TileSlot::T7, TileSlot::T3, TileSlot::T2) => tdp_asm!($insn, "tmm7, tmm3, tmm2"),
            (TileSlot::T7, TileSlot::T3, TileSlot::T4) => tdp_asm!($insn, "tmm7, tmm3, tmm4"),
            (TileSlot::T7, TileSlot::T3, TileSlot::T5) => tdp_asm!($insn, "tmm7, tmm3, tmm5"),
            (TileSlot::T7, TileSlot::T3, TileSlot::T6) => tdp_asm!($insn, "tmm7, tmm3, tmm6"),
            (TileSlot::T7, TileSlot::T4, TileSlot::T0) => tdp_asm!($insn, "tmm7, tmm4, tmm0"),
            (TileSlot::T7, TileSlot::T4, TileSlot::T1) => tdp_asm!($insn, "tmm7, tmm4, tmm1"),
            (TileSlot::T7, TileSlot::T4, TileSlot::T2) => tdp_asm!($insn, "tmm7, tmm4, tmm2"),
            (TileSlot::T7, TileSlot::T4, TileSlot::T3) => tdp_asm!($insn, "tmm7, tmm4, tmm3"),
            (TileSlot::T7, TileSlot::T4, TileSlot::T5) => tdp_asm!($insn, "tmm7, tmm4, tmm5"),
            (TileSlot::T7, TileSlot::T4, TileSlot::T6) => tdp_asm!($insn, "tmm7, tmm4, tmm6"),
            (TileSlot::T7, TileSlot::T5, TileSlot::T0) => tdp_asm!($insn, "tmm7, tmm5, tmm0"),
            (TileSlot::T7, TileSlot::T5, TileSlot::T1) => tdp_asm!($insn, "tmm7, tmm5, tmm1"),
            (TileSlot::T7, TileSlot::T5, TileSlot::T2) => tdp_asm!($insn, "tmm7, tmm5, tmm2"),
            (TileSlot::T7, TileSlot::T5, TileSlot::T3) => tdp_asm!($insn, "tmm7, tmm5, tmm3"),
            (TileSlot::T7, TileSlot::T5, TileSlot::T4) => tdp_asm!($insn, "tmm7, tmm5, tmm4"),
            (TileSlot::T7, TileSlot::T5, TileSlot::T6) => tdp_asm!($insn, "tmm7, tmm5, tmm6"),
            (TileSlot::T7, TileSlot::T6, TileSlot::T0) => tdp_asm!($insn, "tmm7, tmm6, tmm0"),
            (TileSlot::T7, TileSlot::T6, TileSlot::T1) => tdp_asm!($insn, "tmm7, tmm6, tmm1"),
            (TileSlot::T7, TileSlot::T6, TileSlot::T2) => tdp_asm!($insn, "tmm7, tmm6, tmm2"),
            (TileSlot::T7, TileSlot::T6, TileSlot::T3) => tdp_asm!($insn, "tmm7, tmm6, tmm3"),
            (TileSlot::T7, TileSlot::T6, TileSlot::T4) => tdp_asm!($insn, "tmm7, tmm6, tmm4"),
            (TileSlot::T7, TileSlot::T6, TileSlot::T5) => tdp_asm!($insn, "tmm7, tmm6, tmm5"),
            _ => unreachable!("check_dot rejects repeated tiles"),
        }
    };
}

macro_rules! tdp_asm {
    ($insn:literal, $regs:literal) => {
        asm!(concat!($insn, " ", $regs), options(nostack, nomem, preserves_flags))
    };
}

/// Tile engine backed by the CPU's AMX unit.
///
/// Tile state belongs to the thread that configured it, so the engine is
/// neither `Send` nor `Sync`.
pub struct AmxTiles {
    config: Option<TileConfig>,
    _thread_bound: PhantomData<*const ()>,
}

impl AmxTiles {
    /// Whether CPUID reports AMX-TILE, AMX-BF16 and AMX-INT8.
    pub fn is_supported() -> bool {
        #[allow(unused_unsafe)]
        // SAFETY: cpuid is available on every x86_64 CPU
        let (max_leaf, edx) = unsafe {
            use std::arch::x86_64::{__cpuid, __cpuid_count};
            let max_leaf = __cpuid(0).eax;
            let edx = if max_leaf >= 7 { __cpuid_count(7, 0).edx } else { 0 };
            (max_leaf, edx)
        };
        let wanted = CPUID_AMX_TILE | CPUID_AMX_BF16 | CPUID_AMX_INT8;
        max_leaf >= 7 && edx & wanted == wanted
    }

    /// Create the engine.
    ///
    /// Fails unless the CPU has AMX and, on Linux, the process already holds
    /// tile-data permission (see [`super::permission::request_tile_data`]).
    pub fn new() -> Result<Self> {
        if !Self::is_supported() {
            return Err(TileError::Unsupported("CPU lacks AMX-TILE/BF16/INT8"));
        }
        #[cfg(target_os = "linux")]
        {
            if !super::permission::tile_data_permitted()? {
                return Err(TileError::Unsupported("XTILEDATA permission not granted"));
            }
        }
        Ok(Self {
            config: None,
            _thread_bound: PhantomData,
        })
    }
}

impl TileEngine for AmxTiles {
    fn name(&self) -> &'static str {
        "amx"
    }

    fn configure(&mut self, config: &TileConfig) -> Result<()> {
        tracing::debug!("ldtilecfg {:?}", config);
        // SAFETY: TileConfig only admits palette 1 shapes within hardware
        // limits, reserved bytes are zero, and it is 64-byte aligned.
        unsafe {
            asm!(
                "ldtilecfg [{cfg}]",
                cfg = in(reg) config as *const TileConfig,
                options(nostack, readonly, preserves_flags)
            );
        }
        self.config = Some(*config);
        Ok(())
    }

    fn load(&mut self, slot: TileSlot, src: &[u8], stride: usize) -> Result<()> {
        engine::check_access(self.config.as_ref(), slot, src.len(), stride)?;
        let base = src.as_ptr();
        // SAFETY: check_access proved every byte the load touches lies in `src`
        unsafe { with_tmm!(slot, tileloadd!(base, stride,)) };
        Ok(())
    }

    fn zero(&mut self, slot: TileSlot) -> Result<()> {
        engine::used_shape(self.config.as_ref(), slot)?;
        // SAFETY: the slot is configured
        unsafe { with_tmm!(slot, tilezero!()) };
        Ok(())
    }

    fn multiply_accumulate(
        &mut self,
        op: DotProduct,
        dst: TileSlot,
        lhs: TileSlot,
        rhs: TileSlot,
    ) -> Result<()> {
        engine::check_dot(self.config.as_ref(), dst, lhs, rhs)?;
        // SAFETY: check_dot proved the three shapes are compatible and distinct
        unsafe {
            match op {
                DotProduct::Bf16ToF32 => tdp!("tdpbf16ps", dst, lhs, rhs),
                DotProduct::Int8ToI32 => tdp!("tdpbssd", dst, lhs, rhs),
            }
        }
        Ok(())
    }

    fn store(&mut self, slot: TileSlot, dst: &mut [u8], stride: usize) -> Result<()> {
        engine::check_access(self.config.as_ref(), slot, dst.len(), stride)?;
        let base = dst.as_mut_ptr();
        // SAFETY: check_access proved every byte the store touches lies in `dst`
        unsafe { with_tmm!(slot, tilestored!(base, stride,)) };
        Ok(())
    }

    fn release(&mut self) {
        if self.config.take().is_some() {
            tracing::debug!("tilerelease");
            // SAFETY: tilerelease only resets tile state
            unsafe { asm!("tilerelease", options(nostack, nomem, preserves_flags)) };
        }
    }
}

impl Drop for AmxTiles {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::permission::request_tile_data;
    use crate::tile::{ACC, GemmShape, LHS, RHS, ScalarTiles, TileShape};

    fn hardware() -> Option<AmxTiles> {
        if !AmxTiles::is_supported() || request_tile_data().is_err() {
            println!("Skipping - AMX not available");
            return None;
        }
        AmxTiles::new().ok()
    }

    #[test]
    fn test_tdpbssd_single_group() {
        let Some(mut tiles) = hardware() else { return };

        let config = GemmShape::new(1, 1, 4).tile_config(1).unwrap();
        tiles.configure(&config).unwrap();
        let a = [1i8, -2, 3, -4];
        let b = [5i8, 6, -7, 8];
        tiles.load(LHS, bytemuck::cast_slice(&a), 4).unwrap();
        tiles.load(RHS, bytemuck::cast_slice(&b), 4).unwrap();
        tiles.zero(ACC).unwrap();
        tiles
            .multiply_accumulate(DotProduct::Int8ToI32, ACC, LHS, RHS)
            .unwrap();

        let mut c = [0i32; 1];
        tiles.store(ACC, bytemuck::cast_slice_mut(&mut c), 4).unwrap();
        assert_eq!(c[0], 5 - 12 - 21 - 32);
    }

    #[test]
    fn test_dot_on_other_registers() {
        let Some(mut tiles) = hardware() else { return };

        let (dst, lhs, rhs) = (TileSlot::T7, TileSlot::T3, TileSlot::T5);
        let mut config = TileConfig::new();
        config
            .set(dst, TileShape::new(1, 4))
            .unwrap()
            .set(lhs, TileShape::new(1, 4))
            .unwrap()
            .set(rhs, TileShape::new(1, 4))
            .unwrap();
        tiles.configure(&config).unwrap();

        let a = [2i8, 2, 2, 2];
        let b = [3i8, -1, 4, 1];
        tiles.load(lhs, bytemuck::cast_slice(&a), 4).unwrap();
        tiles.load(rhs, bytemuck::cast_slice(&b), 4).unwrap();
        tiles.zero(dst).unwrap();
        tiles
            .multiply_accumulate(DotProduct::Int8ToI32, dst, lhs, rhs)
            .unwrap();

        let mut c = [0i32; 1];
        tiles.store(dst, bytemuck::cast_slice_mut(&mut c), 4).unwrap();
        assert_eq!(c[0], 14);

        assert!(matches!(
            tiles.multiply_accumulate(DotProduct::Int8ToI32, dst, lhs, lhs),
            Err(TileError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_subnormal_bf16_matches_scalar_engine() {
        let Some(mut tiles) = hardware() else { return };
        let mut scalar = ScalarTiles::new();

        // 0x0001 is subnormal; 0x0100 * 0.25 lands below f32::MIN_POSITIVE.
        for (a, b) in [([0x0001u16, 0], [0x3F80u16, 0]), ([0x0100, 0], [0x3E80, 0])] {
            let config = GemmShape::new(1, 1, 2).tile_config(2).unwrap();
            let mut results = Vec::new();
            let engines: [&mut dyn TileEngine; 2] = [&mut tiles, &mut scalar];
            for engine in engines {
                engine.configure(&config).unwrap();
                engine.load(LHS, bytemuck::cast_slice(&a), 4).unwrap();
                engine.load(RHS, bytemuck::cast_slice(&b), 4).unwrap();
                engine.zero(ACC).unwrap();
                engine
                    .multiply_accumulate(DotProduct::Bf16ToF32, ACC, LHS, RHS)
                    .unwrap();
                let mut c = [0u32; 1];
                engine.store(ACC, bytemuck::cast_slice_mut(&mut c), 4).unwrap();
                results.push(c[0]);
            }
            assert_eq!(results[0], results[1], "{:04x?} x {:04x?}", a, b);
        }
    }

    #[test]
    fn test_bad_access_is_rejected_before_the_instruction() {
        let Some(mut tiles) = hardware() else { return };

        let config = GemmShape::new(16, 16, 32).tile_config(2).unwrap();
        tiles.configure(&config).unwrap();
        let short = [0u8; 100];
        assert!(matches!(
            tiles.load(LHS, &short, 64),
            Err(TileError::BufferTooSmall { .. })
        ));
    }
}
