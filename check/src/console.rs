//! stderr backend for `klog`.
//!
//! Nothing is registered by default. Hosts that want to see detection
//! traces opt in with [`init_stderr_logging`].

use std::fmt;
use std::io::{self, Write};

use isacheck_lib::klog::{KlogLevel, klog_register_backend, klog_set_level};

/// Write one log line to stderr under a single lock acquisition.
pub fn klog_stderr_backend(args: fmt::Arguments<'_>) {
    let mut handle = io::stderr().lock();
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
}

/// Route `klog` output at `level` and above to stderr.
pub fn init_stderr_logging(level: KlogLevel) {
    klog_set_level(level);
    klog_register_backend(klog_stderr_backend);
}
