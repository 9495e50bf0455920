//! Evaluate a catalog against the running CPU.
//!
//! One pass issues CPUID leaf 0 for the maximum supported basic leaf, then
//! walks the catalog in order. Each leaf is queried at most once per pass,
//! whatever order entries appear in. An entry whose leaf exceeds the maximum
//! is missing without querying: results for unsupported leaves are undefined
//! and often echo the highest supported leaf.

use isacheck_lib::cpu::{CPUID_LEAF_VENDOR, CpuidResult, cpuid_count};
use isacheck_lib::{klog_debug, klog_trace};

use crate::catalog::{Catalog, MAX_FEATURES};
use crate::missing::MissingSet;

/// Anything that can answer a CPUID query.
pub trait CpuidSource {
    fn cpuid(&mut self, leaf: u32, subleaf: u32) -> CpuidResult;
}

/// The processor this code is running on.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiveCpu;

impl CpuidSource for LiveCpu {
    #[inline]
    fn cpuid(&mut self, leaf: u32, subleaf: u32) -> CpuidResult {
        cpuid_count(leaf, subleaf)
    }
}

impl<C: CpuidSource + ?Sized> CpuidSource for &mut C {
    #[inline]
    fn cpuid(&mut self, leaf: u32, subleaf: u32) -> CpuidResult {
        (**self).cpuid(leaf, subleaf)
    }
}

// Leaf 0 plus one slot per catalog entry.
const LEAF_CACHE_SLOTS: usize = MAX_FEATURES + 1;

/// Per-pass leaf results. A leaf absent from the cache has not been queried
/// yet; leaf 0 is seeded from the max-leaf query.
struct LeafCache {
    max_leaf: u32,
    leaves: [u32; LEAF_CACHE_SLOTS],
    results: [CpuidResult; LEAF_CACHE_SLOTS],
    len: usize,
}

impl LeafCache {
    fn new(leaf0: CpuidResult) -> Self {
        let mut cache = Self {
            max_leaf: leaf0.eax,
            leaves: [0; LEAF_CACHE_SLOTS],
            results: [CpuidResult::default(); LEAF_CACHE_SLOTS],
            len: 0,
        };
        cache.insert(CPUID_LEAF_VENDOR, leaf0);
        cache
    }

    fn insert(&mut self, leaf: u32, result: CpuidResult) {
        if self.len < LEAF_CACHE_SLOTS {
            self.leaves[self.len] = leaf;
            self.results[self.len] = result;
            self.len += 1;
        }
    }

    /// Registers for `leaf`, or `None` when the CPU does not implement it.
    fn lookup<C: CpuidSource + ?Sized>(&mut self, cpu: &mut C, leaf: u32) -> Option<CpuidResult> {
        if leaf > self.max_leaf {
            return None;
        }
        if let Some(slot) = self.leaves[..self.len].iter().position(|&l| l == leaf) {
            return Some(self.results[slot]);
        }
        let result = cpu.cpuid(leaf, 0);
        self.insert(leaf, result);
        Some(result)
    }
}

/// Compute the missing set of `catalog` against `cpu`.
///
/// An empty catalog issues no queries at all.
pub fn detect_with<'a, C: CpuidSource + ?Sized>(catalog: &Catalog<'a>, cpu: &mut C) -> MissingSet<'a> {
    if catalog.is_empty() {
        klog_trace!("isacheck: empty catalog, nothing to detect");
        return MissingSet::none(*catalog);
    }

    let mut cache = LeafCache::new(cpu.cpuid(CPUID_LEAF_VENDOR, 0));
    klog_trace!("isacheck: max basic leaf {:#x}", cache.max_leaf);

    let mut bits = 0u64;
    for (index, spec) in catalog.iter().enumerate() {
        let present = match cache.lookup(cpu, spec.leaf()) {
            Some(regs) => regs.bit_set(spec.register(), spec.bit()),
            None => false,
        };
        klog_trace!(
            "isacheck: {} (leaf {:#x} {} bit {}): {}",
            spec.name(),
            spec.leaf(),
            spec.register(),
            spec.bit(),
            if present { "present" } else { "missing" }
        );
        if !present {
            bits |= 1 << index;
        }
    }

    let missing = MissingSet::from_bits(*catalog, bits);
    klog_debug!(
        "isacheck: {} of {} required extensions missing",
        missing.count(),
        catalog.len()
    );
    missing
}

/// Compute the missing set of `catalog` on the running CPU.
pub fn detect<'a>(catalog: &Catalog<'a>) -> MissingSet<'a> {
    detect_with(catalog, &mut LiveCpu)
}
