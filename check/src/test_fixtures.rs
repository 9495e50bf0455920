use isacheck_lib::cpu::{CPUID_LEAF_VENDOR, CpuidResult};

use crate::catalog::Register;
use crate::detect::CpuidSource;

/// Scripted CPU that records every leaf it is asked for.
///
/// Leaf 0 reports `max_leaf` in EAX. Leaves above `max_leaf` answer with
/// all bits set, so a detector that wrongly trusts them sees every feature
/// as present.
pub struct SimulatedCpu {
    max_leaf: u32,
    leaves: Vec<(u32, CpuidResult)>,
    queries: Vec<u32>,
}

impl SimulatedCpu {
    pub fn new(max_leaf: u32) -> Self {
        Self {
            max_leaf,
            leaves: Vec::new(),
            queries: Vec::new(),
        }
    }

    /// Set `bits` of `reg` in the answer for `leaf`.
    pub fn with_bits(mut self, leaf: u32, reg: Register, bits: &[u8]) -> Self {
        let mask = bits.iter().fold(0u32, |acc, bit| acc | (1u32 << *bit));
        let index = match self.leaves.iter().position(|(l, _)| *l == leaf) {
            Some(index) => index,
            None => {
                self.leaves.push((leaf, CpuidResult::default()));
                self.leaves.len() - 1
            }
        };
        let regs = &mut self.leaves[index].1;
        match reg {
            Register::Eax => regs.eax |= mask,
            Register::Ebx => regs.ebx |= mask,
            Register::Ecx => regs.ecx |= mask,
            Register::Edx => regs.edx |= mask,
        }
        self
    }

    pub fn queries(&self) -> &[u32] {
        &self.queries
    }

    pub fn query_count(&self, leaf: u32) -> usize {
        self.queries.iter().filter(|&&l| l == leaf).count()
    }
}

impl CpuidSource for SimulatedCpu {
    fn cpuid(&mut self, leaf: u32, _subleaf: u32) -> CpuidResult {
        self.queries.push(leaf);
        if leaf > self.max_leaf {
            return CpuidResult {
                eax: u32::MAX,
                ebx: u32::MAX,
                ecx: u32::MAX,
                edx: u32::MAX,
            };
        }
        let mut result = self
            .leaves
            .iter()
            .find(|(l, _)| *l == leaf)
            .map(|(_, regs)| *regs)
            .unwrap_or_default();
        if leaf == CPUID_LEAF_VENDOR {
            result.eax = self.max_leaf;
        }
        result
    }
}
