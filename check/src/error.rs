//! Errors raised while assembling a catalog from runtime input.
//!
//! Detection itself has no error path: an unsupported leaf and a clear bit
//! both mean "missing" and are reported through [`crate::report`]. These
//! variants cover only the configuration layer that turns strings or slices
//! into a [`Catalog`](crate::Catalog).

use core::fmt;

use crate::catalog::MAX_FEATURES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    TooManyFeatures { count: usize },
    BitOutOfRange { bit: u32 },
    UnknownExtension(String),
    InvalidRegister(String),
    InvalidLeaf(String),
    MalformedSpec(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyFeatures { count } => write!(
                f,
                "too many required extensions: {} (at most {} fit the missing set)",
                count, MAX_FEATURES
            ),
            Self::BitOutOfRange { bit } => {
                write!(f, "bit {} out of range (CPUID words are 32 bits)", bit)
            }
            Self::UnknownExtension(name) => write!(f, "unknown extension '{}'", name),
            Self::InvalidRegister(name) => {
                write!(f, "invalid register '{}' (expected eax, ebx, ecx or edx)", name)
            }
            Self::InvalidLeaf(leaf) => write!(f, "invalid CPUID leaf '{}'", leaf),
            Self::MalformedSpec(spec) => {
                write!(f, "malformed feature spec '{}' (expected NAME:LEAF:REG:BIT)", spec)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Convenience result type for catalog construction.
pub type CatalogResult<T = ()> = Result<T, CatalogError>;
