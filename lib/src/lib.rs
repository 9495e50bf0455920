#![no_std]

pub mod cpu;
pub mod klog;

#[cfg(test)]
extern crate std;

pub use cpu::{CpuidRegister, CpuidResult, cpuid_count};
pub use klog::{
    KlogBackend, KlogLevel, klog_get_level, klog_init, klog_is_enabled, klog_register_backend,
    klog_set_level,
};
