pub mod cpuid;

pub use cpuid::*;
