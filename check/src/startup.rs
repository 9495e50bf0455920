//! Running the check once at process startup.
//!
//! There are three ways in, all funnelling into [`run_startup_check`]:
//!
//! * the `auto-check` cargo feature (default) places a constructor in this
//!   crate, so the check runs before `main` as soon as the crate is linked;
//! * [`startup_hook!`](crate::startup_hook) places the same constructor in
//!   the *calling* crate, for hosts that register it deliberately;
//! * calling [`run_startup_check`] from `main` at a point of the host's
//!   choosing.
//!
//! The startup result is computed at most once per process whichever
//! combination is used.
//!
//! Linkers only pull in object files something refers to. With
//! `auto-check` alone, a host that never names an `isacheck` item may drop
//! the constructor; registering through [`startup_hook!`] avoids that.

use spin::Once;

use isacheck_lib::klog_debug;

use crate::detect::detect;
use crate::missing::MissingSet;
use crate::registry::REQUIRED;
use crate::report::diagnose;

static STARTUP_RESULT: Once<MissingSet<'static>> = Once::new();

/// Detect the build's [`REQUIRED`] catalog, once per process.
pub fn startup_check() -> MissingSet<'static> {
    *STARTUP_RESULT.call_once(|| {
        klog_debug!("isacheck: checking {} required extensions", REQUIRED.len());
        detect(&REQUIRED)
    })
}

/// The memoised startup result, if the check has run.
pub fn startup_result() -> Option<MissingSet<'static>> {
    STARTUP_RESULT.get().copied()
}

/// Check the build's [`REQUIRED`] catalog and terminate the process with the
/// diagnostic if anything is missing.
pub fn run_startup_check() {
    diagnose(&startup_check());
}

/// Constructor entry placed in the platform's init section.
#[doc(hidden)]
pub extern "C" fn startup_hook_entry() {
    run_startup_check();
}

/// Register the startup check as a constructor of the calling crate.
///
/// Expands to a `#[used]` static in the platform's constructor section
/// (`.init_array` on ELF, `__mod_init_func` on Apple targets, `.CRT$XCU` on
/// Windows). Invoke once, at item level, in the host binary:
///
/// ```ignore
/// isacheck::startup_hook!();
/// ```
#[macro_export]
macro_rules! startup_hook {
    () => {
        $crate::startup_hook!(ISACHECK_STARTUP_HOOK);
    };
    ($static_name:ident) => {
        #[used]
        #[cfg_attr(
            any(
                target_os = "linux",
                target_os = "android",
                target_os = "freebsd",
                target_os = "netbsd",
                target_os = "openbsd",
                target_os = "dragonfly",
                target_os = "illumos",
                target_os = "solaris"
            ),
            unsafe(link_section = ".init_array")
        )]
        #[cfg_attr(target_vendor = "apple", unsafe(link_section = "__DATA,__mod_init_func"))]
        #[cfg_attr(windows, unsafe(link_section = ".CRT$XCU"))]
        static $static_name: extern "C" fn() = $crate::startup::startup_hook_entry;
    };
}

#[cfg(all(feature = "auto-check", not(test)))]
crate::startup_hook!(ISACHECK_AUTO_STARTUP_HOOK);

#[cfg(test)]
mod tests {
    use super::*;

    // The test binary is built for the machine running it, so the build's
    // own requirements are satisfied here.
    #[test]
    fn startup_check_is_memoised_and_passes_on_build_host() {
        let first = startup_check();
        assert!(!first.is_any_missing());
        assert_eq!(startup_result(), Some(first));
        assert_eq!(startup_check(), first);
        assert_eq!(first.catalog(), REQUIRED);

        run_startup_check();
    }
}
