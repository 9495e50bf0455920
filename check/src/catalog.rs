//! Feature table: what the running CPU must provide, and where to look.
//!
//! A [`FeatureSpec`] locates one capability bit inside the result of a CPUID
//! query. A [`Catalog`] is the ordered list of specs a detection pass
//! evaluates. Order matters twice: it decides bit positions in the
//! [`MissingSet`](crate::MissingSet) and the order names appear in the
//! diagnostic.

use core::slice;

use isacheck_lib::cpu::CpuidRegister;

use crate::error::{CatalogError, CatalogResult};

/// Result word of a CPUID query.
pub type Register = CpuidRegister;

/// Maximum catalog length: one bit per entry in a `u64`.
pub const MAX_FEATURES: usize = u64::BITS as usize;

/// One required CPU capability and how to test for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FeatureSpec<'a> {
    name: &'a str,
    leaf: u32,
    register: Register,
    bit: u8,
}

impl<'a> FeatureSpec<'a> {
    /// Build a spec at compile time. A `bit` above 31 fails const evaluation.
    pub const fn new(name: &'a str, leaf: u32, register: Register, bit: u8) -> Self {
        assert!(bit < 32, "CPUID result words are 32 bits wide");
        Self {
            name,
            leaf,
            register,
            bit,
        }
    }

    pub fn try_new(name: &'a str, leaf: u32, register: Register, bit: u32) -> CatalogResult<Self> {
        if bit >= 32 {
            return Err(CatalogError::BitOutOfRange { bit });
        }
        Ok(Self {
            name,
            leaf,
            register,
            bit: bit as u8,
        })
    }

    /// Parse `NAME:LEAF:REG:BIT`, e.g. `AVX:1:ecx:28` or `BMI2:0x7:ebx:8`.
    pub fn parse(spec: &'a str) -> CatalogResult<Self> {
        let mut parts = spec.split(':');
        let (Some(name), Some(leaf), Some(reg), Some(bit), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(CatalogError::MalformedSpec(spec.into()));
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::MalformedSpec(spec.into()));
        }
        let leaf = parse_u32(leaf.trim()).ok_or_else(|| CatalogError::InvalidLeaf(leaf.into()))?;
        let register = Register::from_name(reg.trim())
            .ok_or_else(|| CatalogError::InvalidRegister(reg.into()))?;
        let bit = bit
            .trim()
            .parse::<u32>()
            .map_err(|_| CatalogError::MalformedSpec(spec.into()))?;

        Self::try_new(name, leaf, register, bit)
    }

    #[inline]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    #[inline]
    pub const fn leaf(&self) -> u32 {
        self.leaf
    }

    #[inline]
    pub const fn register(&self) -> Register {
        self.register
    }

    #[inline]
    pub const fn bit(&self) -> u8 {
        self.bit
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Ordered, immutable sequence of at most [`MAX_FEATURES`] specs.
///
/// Built in a `const` or `static` initializer, an oversized catalog is a
/// build error:
///
/// ```compile_fail
/// use isacheck::{Catalog, FeatureSpec, Register};
///
/// const SPEC: FeatureSpec<'static> = FeatureSpec::new("X", 1, Register::Ecx, 0);
/// static TOO_BIG: Catalog<'static> = Catalog::new(&[SPEC; 65]);
/// ```
///
/// while a full word's worth is accepted:
///
/// ```
/// use isacheck::{Catalog, FeatureSpec, Register};
///
/// const SPEC: FeatureSpec<'static> = FeatureSpec::new("X", 1, Register::Ecx, 0);
/// static FULL: Catalog<'static> = Catalog::new(&[SPEC; 64]);
/// assert_eq!(FULL.len(), 64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Catalog<'a> {
    specs: &'a [FeatureSpec<'a>],
}

impl<'a> Catalog<'a> {
    pub const fn new(specs: &'a [FeatureSpec<'a>]) -> Self {
        assert!(
            specs.len() <= MAX_FEATURES,
            "catalog does not fit in the missing-set word"
        );
        Self { specs }
    }

    /// Runtime counterpart of [`Catalog::new`] for catalogs assembled from
    /// user input.
    pub fn try_new(specs: &'a [FeatureSpec<'a>]) -> CatalogResult<Self> {
        if specs.len() > MAX_FEATURES {
            return Err(CatalogError::TooManyFeatures { count: specs.len() });
        }
        Ok(Self { specs })
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    #[inline]
    pub const fn as_slice(&self) -> &'a [FeatureSpec<'a>] {
        self.specs
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a FeatureSpec<'a>> {
        self.specs.get(index)
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'a, FeatureSpec<'a>> {
        self.specs.iter()
    }
}

impl<'a> IntoIterator for Catalog<'a> {
    type Item = &'a FeatureSpec<'a>;
    type IntoIter = slice::Iter<'a, FeatureSpec<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: FeatureSpec<'static> = FeatureSpec::new("AVX", 1, Register::Ecx, 28);

    #[test]
    fn catalog_sizes_up_to_word_width_are_accepted() {
        let specs = vec![SPEC; MAX_FEATURES + 1];
        for n in 0..=MAX_FEATURES {
            let catalog = Catalog::try_new(&specs[..n]).unwrap();
            assert_eq!(catalog.len(), n);
            assert_eq!(catalog.is_empty(), n == 0);
        }
    }

    #[test]
    fn oversized_runtime_catalog_is_rejected() {
        let specs = vec![SPEC; MAX_FEATURES + 1];
        assert_eq!(
            Catalog::try_new(&specs),
            Err(CatalogError::TooManyFeatures { count: 65 })
        );
    }

    #[test]
    #[should_panic(expected = "catalog does not fit")]
    fn oversized_const_constructor_panics_outside_const_context() {
        let specs = vec![SPEC; MAX_FEATURES + 1];
        let _ = Catalog::new(&specs);
    }

    #[test]
    fn parse_accepts_decimal_and_hex_leaves() {
        let spec = FeatureSpec::parse("BMI2:0x7:EBX:8").unwrap();
        assert_eq!(spec.name(), "BMI2");
        assert_eq!(spec.leaf(), 7);
        assert_eq!(spec.register(), Register::Ebx);
        assert_eq!(spec.bit(), 8);

        let spec = FeatureSpec::parse("SSE 4.2:1:ecx:20").unwrap();
        assert_eq!(spec.name(), "SSE 4.2");
        assert_eq!(spec.leaf(), 1);
    }

    #[test]
    fn parse_rejects_bad_fields() {
        assert_eq!(
            FeatureSpec::parse("AVX:1:ecx"),
            Err(CatalogError::MalformedSpec("AVX:1:ecx".into()))
        );
        assert_eq!(
            FeatureSpec::parse("AVX:1:ecx:28:9"),
            Err(CatalogError::MalformedSpec("AVX:1:ecx:28:9".into()))
        );
        assert_eq!(
            FeatureSpec::parse(":1:ecx:28"),
            Err(CatalogError::MalformedSpec(":1:ecx:28".into()))
        );
        assert_eq!(
            FeatureSpec::parse("AVX:one:ecx:28"),
            Err(CatalogError::InvalidLeaf("one".into()))
        );
        assert_eq!(
            FeatureSpec::parse("AVX:1:rcx:28"),
            Err(CatalogError::InvalidRegister("rcx".into()))
        );
        assert_eq!(
            FeatureSpec::parse("AVX:1:ecx:32"),
            Err(CatalogError::BitOutOfRange { bit: 32 })
        );
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let specs = [
            FeatureSpec::new("B", 7, Register::Ebx, 3),
            FeatureSpec::new("A", 1, Register::Ecx, 0),
        ];
        let catalog = Catalog::new(&specs);
        let names: Vec<_> = catalog.iter().map(FeatureSpec::name).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(catalog.get(1).map(FeatureSpec::leaf), Some(1));
        assert_eq!(catalog.get(2), None);
    }
}
