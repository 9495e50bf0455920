//! The result of a detection pass.

use core::fmt;
use core::iter::FusedIterator;

use crate::catalog::{Catalog, FeatureSpec};

/// Required-but-unsupported catalog entries: one bit per catalog index.
///
/// Produced once by [`detect`](crate::detect) and never modified. The set
/// keeps the catalog it was computed against so names can be resolved
/// without the caller holding on to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissingSet<'a> {
    catalog: Catalog<'a>,
    bits: u64,
}

impl<'a> MissingSet<'a> {
    pub(crate) const fn from_bits(catalog: Catalog<'a>, bits: u64) -> Self {
        Self { catalog, bits }
    }

    /// An empty set for `catalog`.
    pub const fn none(catalog: Catalog<'a>) -> Self {
        Self::from_bits(catalog, 0)
    }

    /// Raw bitset; bit `i` is catalog entry `i`.
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub const fn is_any_missing(&self) -> bool {
        self.bits != 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.catalog.len() && (self.bits >> index) & 1 == 1
    }

    #[inline]
    pub const fn catalog(&self) -> Catalog<'a> {
        self.catalog
    }

    /// Missing specs in catalog order.
    pub fn iter(&self) -> MissingIter<'a> {
        MissingIter {
            specs: self.catalog.as_slice(),
            bits: self.bits,
        }
    }

    /// Missing feature names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + Clone + use<'a> {
        self.iter().map(|spec| spec.name())
    }
}

impl<'a> IntoIterator for &MissingSet<'a> {
    type Item = &'a FeatureSpec<'a>;
    type IntoIter = MissingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the names joined by `", "`, e.g. `AVX, BMI2`.
impl fmt::Display for MissingSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for name in self.names() {
            f.write_str(separator)?;
            f.write_str(name)?;
            separator = ", ";
        }
        Ok(())
    }
}

/// Iterator over the set bits of a [`MissingSet`], lowest index first.
#[derive(Clone, Debug)]
pub struct MissingIter<'a> {
    specs: &'a [FeatureSpec<'a>],
    bits: u64,
}

impl<'a> Iterator for MissingIter<'a> {
    type Item = &'a FeatureSpec<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.bits != 0 {
            let index = self.bits.trailing_zeros() as usize;
            self.bits &= self.bits - 1;
            if let Some(spec) = self.specs.get(index) {
                return Some(spec);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.bits.count_ones() as usize))
    }
}

impl FusedIterator for MissingIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Register;

    const SPECS: [FeatureSpec<'static>; 4] = [
        FeatureSpec::new("SSE 4.2", 1, Register::Ecx, 20),
        FeatureSpec::new("AVX", 1, Register::Ecx, 28),
        FeatureSpec::new("BMI", 7, Register::Ebx, 3),
        FeatureSpec::new("BMI2", 7, Register::Ebx, 8),
    ];

    #[test]
    fn names_follow_catalog_order() {
        let set = MissingSet::from_bits(Catalog::new(&SPECS), 0b1010);
        assert!(set.is_any_missing());
        assert_eq!(set.count(), 2);
        assert_eq!(set.names().collect::<Vec<_>>(), ["AVX", "BMI2"]);
        assert!(set.contains(1));
        assert!(!set.contains(2));
        assert!(!set.contains(64));
    }

    #[test]
    fn names_can_be_iterated_repeatedly() {
        let set = MissingSet::from_bits(Catalog::new(&SPECS), 0b0101);
        let names = set.names();
        assert_eq!(names.clone().count(), 2);
        assert_eq!(names.collect::<Vec<_>>(), ["SSE 4.2", "BMI"]);
        assert_eq!(set.names().collect::<Vec<_>>(), ["SSE 4.2", "BMI"]);
    }

    #[test]
    fn empty_set_yields_nothing() {
        let set = MissingSet::none(Catalog::new(&SPECS));
        assert!(!set.is_any_missing());
        assert_eq!(set.iter().next(), None);
        assert_eq!(set.to_string(), "");
    }

    #[test]
    fn display_joins_with_comma_space() {
        let one = MissingSet::from_bits(Catalog::new(&SPECS), 0b0001);
        assert_eq!(one.to_string(), "SSE 4.2");

        let all = MissingSet::from_bits(Catalog::new(&SPECS), 0b1111);
        assert_eq!(all.to_string(), "SSE 4.2, AVX, BMI, BMI2");
    }

    #[test]
    fn iteration_by_reference_yields_specs() {
        let set = MissingSet::from_bits(Catalog::new(&SPECS), 0b1000);
        let leaves: Vec<_> = (&set).into_iter().map(FeatureSpec::leaf).collect();
        assert_eq!(leaves, [7]);
    }
}
