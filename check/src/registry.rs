//! Every extension a build may require, declared once.
//!
//! An extension is *required* when this crate is compiled with its Rust
//! target feature enabled (`-C target-feature=+avx`, `-C target-cpu=...`) or
//! with `--cfg isacheck_require="<ident>"` in its rustflags, `<ident>` being
//! the [`Extension::ident`] spelling. Extensions Rust has no target feature
//! for (FSGSBASE, SGX, CLFLUSHOPT) can only be required through the cfg.
//!
//! The first seventeen rows keep their historical order; diagnostics list
//! missing names in this order.

use paste::paste;

use isacheck_lib::cpu::{CPUID_LEAF_FEATURES, CPUID_LEAF_STRUCTURED_EXT};

use crate::catalog::{Catalog, FeatureSpec, Register};
use crate::error::{CatalogError, CatalogResult};

macro_rules! extension_registry {
    ($(
        #[cfg($($required:tt)*)]
        $variant:ident => ($ident:literal, $name:literal, $leaf:expr, $reg:ident, $bit:literal);
    )*) => {
        paste! {
            /// An instruction-set extension known to the registry.
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
            pub enum Extension {
                $($variant,)*
            }

            impl Extension {
                /// All registry entries in catalog order.
                pub const ALL: &'static [Extension] = &[$(Extension::$variant,)*];

                pub const fn spec(self) -> FeatureSpec<'static> {
                    match self {
                        $(Extension::$variant => [<FEATURE_ $variant:upper>],)*
                    }
                }

                /// Identifier accepted on the command line; the Rust target
                /// feature name where one exists.
                pub const fn ident(self) -> &'static str {
                    match self {
                        $(Extension::$variant => $ident,)*
                    }
                }

                /// Whether this build requires the extension.
                pub const fn is_required(self) -> bool {
                    match self {
                        $(Extension::$variant => cfg!($($required)*),)*
                    }
                }
            }

            $(
                pub const [<FEATURE_ $variant:upper>]: FeatureSpec<'static> =
                    FeatureSpec::new($name, $leaf, Register::$reg, $bit);
            )*

            static KNOWN_SPECS: &[FeatureSpec<'static>] = &[
                $([<FEATURE_ $variant:upper>],)*
            ];

            static REQUIRED_SPECS: &[FeatureSpec<'static>] = &[
                $(
                    #[cfg($($required)*)]
                    [<FEATURE_ $variant:upper>],
                )*
            ];
        }
    };
}

extension_registry! {
    #[cfg(any(target_feature = "sse3", isacheck_require = "sse3"))]
    Sse3 => ("sse3", "SSE 3", CPUID_LEAF_FEATURES, Ecx, 0);
    #[cfg(any(target_feature = "sse4.1", isacheck_require = "sse4.1"))]
    Sse4_1 => ("sse4.1", "SSE 4.1", CPUID_LEAF_FEATURES, Ecx, 19);
    #[cfg(any(target_feature = "sse4.2", isacheck_require = "sse4.2"))]
    Sse4_2 => ("sse4.2", "SSE 4.2", CPUID_LEAF_FEATURES, Ecx, 20);
    #[cfg(any(target_feature = "popcnt", isacheck_require = "popcnt"))]
    Popcnt => ("popcnt", "POPCNT", CPUID_LEAF_FEATURES, Ecx, 23);
    #[cfg(any(target_feature = "xsave", isacheck_require = "xsave"))]
    Xsave => ("xsave", "XSAVE", CPUID_LEAF_FEATURES, Ecx, 26);
    #[cfg(any(target_feature = "avx", isacheck_require = "avx"))]
    Avx => ("avx", "AVX", CPUID_LEAF_FEATURES, Ecx, 28);
    #[cfg(any(target_feature = "f16c", isacheck_require = "f16c"))]
    F16c => ("f16c", "F16C", CPUID_LEAF_FEATURES, Ecx, 29);
    #[cfg(any(target_feature = "rdrand", isacheck_require = "rdrand"))]
    Rdrnd => ("rdrand", "RDRND", CPUID_LEAF_FEATURES, Ecx, 30);
    #[cfg(any(target_feature = "pclmulqdq", isacheck_require = "pclmulqdq"))]
    Pclmul => ("pclmulqdq", "PCLMUL", CPUID_LEAF_FEATURES, Ecx, 1);
    #[cfg(isacheck_require = "fsgsbase")]
    Fsgsbase => ("fsgsbase", "FSGSBASE", CPUID_LEAF_STRUCTURED_EXT, Ebx, 0);
    #[cfg(isacheck_require = "sgx")]
    Sgx => ("sgx", "SGX", CPUID_LEAF_STRUCTURED_EXT, Ebx, 2);
    #[cfg(any(target_feature = "bmi1", isacheck_require = "bmi1"))]
    Bmi => ("bmi1", "BMI", CPUID_LEAF_STRUCTURED_EXT, Ebx, 3);
    #[cfg(any(target_feature = "bmi2", isacheck_require = "bmi2"))]
    Bmi2 => ("bmi2", "BMI2", CPUID_LEAF_STRUCTURED_EXT, Ebx, 8);
    #[cfg(any(target_feature = "rtm", isacheck_require = "rtm"))]
    Rtm => ("rtm", "RTM", CPUID_LEAF_STRUCTURED_EXT, Ebx, 11);
    #[cfg(isacheck_require = "clflushopt")]
    Clflushopt => ("clflushopt", "CLFLUSHOPT", CPUID_LEAF_STRUCTURED_EXT, Ebx, 23);
    #[cfg(any(target_feature = "rdseed", isacheck_require = "rdseed"))]
    Rdseed => ("rdseed", "RDSEED", CPUID_LEAF_STRUCTURED_EXT, Ebx, 18);
    #[cfg(any(target_feature = "adx", isacheck_require = "adx"))]
    Adx => ("adx", "ADX", CPUID_LEAF_STRUCTURED_EXT, Ebx, 19);
    #[cfg(any(target_feature = "ssse3", isacheck_require = "ssse3"))]
    Ssse3 => ("ssse3", "SSSE3", CPUID_LEAF_FEATURES, Ecx, 9);
    #[cfg(any(target_feature = "fma", isacheck_require = "fma"))]
    Fma => ("fma", "FMA", CPUID_LEAF_FEATURES, Ecx, 12);
    #[cfg(any(target_feature = "movbe", isacheck_require = "movbe"))]
    Movbe => ("movbe", "MOVBE", CPUID_LEAF_FEATURES, Ecx, 22);
    #[cfg(any(target_feature = "aes", isacheck_require = "aes"))]
    Aes => ("aes", "AES", CPUID_LEAF_FEATURES, Ecx, 25);
    #[cfg(any(target_feature = "avx2", isacheck_require = "avx2"))]
    Avx2 => ("avx2", "AVX2", CPUID_LEAF_STRUCTURED_EXT, Ebx, 5);
    #[cfg(any(target_feature = "avx512f", isacheck_require = "avx512f"))]
    Avx512f => ("avx512f", "AVX512F", CPUID_LEAF_STRUCTURED_EXT, Ebx, 16);
    #[cfg(any(target_feature = "sha", isacheck_require = "sha"))]
    Sha => ("sha", "SHA", CPUID_LEAF_STRUCTURED_EXT, Ebx, 29);
}

/// Extensions this build was compiled to assume.
pub static REQUIRED: Catalog<'static> = Catalog::new(REQUIRED_SPECS);

/// Every registry entry, required or not.
pub static KNOWN: Catalog<'static> = Catalog::new(KNOWN_SPECS);

impl Extension {
    /// Look up an extension by identifier or display name, ignoring ASCII
    /// case and spaces: `sse4.2`, `SSE 4.2`, `pclmul` and `pclmulqdq` all
    /// resolve.
    pub fn from_ident(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.iter().copied().find(|ext| {
            ext.ident().eq_ignore_ascii_case(value) || eq_ignoring_spaces(ext.spec().name(), value)
        })
    }
}

impl core::fmt::Display for Extension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.spec().name())
    }
}

fn eq_ignoring_spaces(name: &str, value: &str) -> bool {
    let mut lhs = name.bytes().filter(|b| *b != b' ');
    let mut rhs = value.bytes().filter(|b| *b != b' ');
    loop {
        match (lhs.next(), rhs.next()) {
            (None, None) => return true,
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(&b) => {}
            _ => return false,
        }
    }
}

/// Resolve one requirement: a raw `NAME:LEAF:REG:BIT` spec, or the name of a
/// registry extension.
pub fn resolve_requirement(value: &str) -> CatalogResult<FeatureSpec<'_>> {
    if value.contains(':') {
        return FeatureSpec::parse(value);
    }
    Extension::from_ident(value)
        .map(Extension::spec)
        .ok_or_else(|| CatalogError::UnknownExtension(value.into()))
}
