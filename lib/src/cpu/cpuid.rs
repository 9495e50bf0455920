//! CPU identification via the CPUID instruction.
//!
//! This module provides the CPUID instruction wrapper, the result word type
//! and the leaf numbers the startup check issues queries against.
//!
//! Only basic leaves are covered. Extended leaves (`0x8000_0000` and up) have
//! their own maximum and are not consulted by the check.

// =============================================================================
// CPUID Leaf Numbers
// =============================================================================

/// Maximum supported basic leaf (EAX) and vendor identification (EBX/EDX/ECX).
pub const CPUID_LEAF_VENDOR: u32 = 0x00;

/// Basic CPU information and feature flags.
pub const CPUID_LEAF_FEATURES: u32 = 0x01;

/// Structured extended feature flags (subleaf 0).
pub const CPUID_LEAF_STRUCTURED_EXT: u32 = 0x07;

// =============================================================================
// Result words
// =============================================================================

/// One of the four 32-bit words a CPUID query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CpuidRegister {
    Eax,
    Ebx,
    Ecx,
    Edx,
}

impl CpuidRegister {
    pub const ALL: [CpuidRegister; 4] = [Self::Eax, Self::Ebx, Self::Ecx, Self::Edx];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eax => "eax",
            Self::Ebx => "ebx",
            Self::Ecx => "ecx",
            Self::Edx => "edx",
        }
    }

    /// Parse a register name, ignoring ASCII case (`"ecx"`, `"ECX"`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|reg| reg.as_str().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for CpuidRegister {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Register snapshot of a single CPUID query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuidResult {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

impl CpuidResult {
    #[inline]
    pub const fn register(&self, reg: CpuidRegister) -> u32 {
        match reg {
            CpuidRegister::Eax => self.eax,
            CpuidRegister::Ebx => self.ebx,
            CpuidRegister::Ecx => self.ecx,
            CpuidRegister::Edx => self.edx,
        }
    }

    /// Test a single bit of one result word. `bit` must be below 32.
    #[inline]
    pub const fn bit_set(&self, reg: CpuidRegister, bit: u8) -> bool {
        (self.register(reg) >> bit) & 1 == 1
    }

    /// Vendor string of a leaf 0 result, e.g. `b"GenuineIntel"`.
    ///
    /// The twelve bytes are stored in EBX, EDX, ECX order.
    pub fn vendor_id(&self) -> [u8; 12] {
        let mut id = [0u8; 12];
        id[0..4].copy_from_slice(&self.ebx.to_le_bytes());
        id[4..8].copy_from_slice(&self.edx.to_le_bytes());
        id[8..12].copy_from_slice(&self.ecx.to_le_bytes());
        id
    }
}

// =============================================================================
// CPUID Instruction Wrapper
// =============================================================================

/// Execute CPUID with a specific leaf **and subleaf** (ECX).
///
/// Leaf `0x07` enumerates several subleaves; the check only ever reads
/// subleaf 0. The result for a leaf above the reported maximum is
/// unspecified, so callers must compare against leaf 0's EAX first.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[allow(unused_unsafe)]
pub fn cpuid_count(leaf: u32, subleaf: u32) -> CpuidResult {
    let res = unsafe { core::arch::x86_64::__cpuid_count(leaf, subleaf) };
    CpuidResult {
        eax: res.eax,
        ebx: res.ebx,
        ecx: res.ecx,
        edx: res.edx,
    }
}

#[cfg(target_arch = "x86")]
#[inline(always)]
#[allow(unused_unsafe)]
pub fn cpuid_count(leaf: u32, subleaf: u32) -> CpuidResult {
    let res = unsafe { core::arch::x86::__cpuid_count(leaf, subleaf) };
    CpuidResult {
        eax: res.eax,
        ebx: res.ebx,
        ecx: res.ecx,
        edx: res.edx,
    }
}

/// Non-x86 targets have no CPUID; every query reads as all-zero, so the
/// maximum leaf is 0 and every feature leaf reads as unsupported.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[inline(always)]
pub fn cpuid_count(_leaf: u32, _subleaf: u32) -> CpuidResult {
    CpuidResult::default()
}
