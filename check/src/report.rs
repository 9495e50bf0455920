//! Turn a [`MissingSet`] into the startup diagnostic and enforce the
//! termination policy.
//!
//! A deficient CPU is fatal: continuing would trade one clear message now for
//! an illegal-instruction fault somewhere later.

use std::io::{self, Write};
use std::process;

use isacheck_lib::klog_error;

use crate::missing::MissingSet;

/// Exit status of a process stopped by [`diagnose`]. Stable; scripts may rely
/// on it.
pub const EXIT_MISSING_EXTENSIONS: i32 = 1;

const DIAGNOSTIC_PREFIX: &str =
    "error: This program requires the following extensions, which are not supported by this machine: ";

/// True iff at least one required extension is missing.
#[inline]
pub fn is_any_missing(missing: &MissingSet<'_>) -> bool {
    missing.is_any_missing()
}

/// Call `visit` once per missing feature name, in catalog order.
pub fn for_each_missing<'a>(missing: &MissingSet<'a>, mut visit: impl FnMut(&'a str)) {
    for name in missing.names() {
        visit(name);
    }
}

/// Write the diagnostic line for `missing` to `out`.
///
/// Writes nothing and returns `Ok(false)` when nothing is missing. The line
/// is assembled first and written with a single call.
pub fn write_diagnostic<W: Write + ?Sized>(missing: &MissingSet<'_>, out: &mut W) -> io::Result<bool> {
    if !is_any_missing(missing) {
        return Ok(false);
    }

    let mut line = String::from(DIAGNOSTIC_PREFIX);
    let mut separator = "";
    for_each_missing(missing, |name| {
        line.push_str(separator);
        line.push_str(name);
        separator = ", ";
    });
    line.push('\n');

    out.write_all(line.as_bytes())?;
    out.flush()?;
    Ok(true)
}

/// Report missing extensions on stderr and exit with
/// [`EXIT_MISSING_EXTENSIONS`]. Returns only when nothing is missing, and
/// then without any output.
pub fn diagnose(missing: &MissingSet<'_>) {
    if is_any_missing(missing) {
        terminate(missing);
    }
}

fn terminate(missing: &MissingSet<'_>) -> ! {
    let mut handle = io::stderr().lock();
    if let Err(err) = write_diagnostic(missing, &mut handle) {
        klog_error!("isacheck: failed to write diagnostic: {}", err);
    }
    drop(handle);
    process::exit(EXIT_MISSING_EXTENSIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FeatureSpec, Register};
    use crate::detect::detect_with;
    use crate::test_fixtures::SimulatedCpu;

    const SPECS: [FeatureSpec<'static>; 3] = [
        FeatureSpec::new("AVX", 1, Register::Ecx, 28),
        FeatureSpec::new("SSE 4.2", 1, Register::Ecx, 20),
        FeatureSpec::new("BMI2", 7, Register::Ebx, 8),
    ];

    fn render(missing: &MissingSet<'_>) -> (bool, String) {
        let mut out = Vec::new();
        let written = write_diagnostic(missing, &mut out).unwrap();
        (written, String::from_utf8(out).unwrap())
    }

    #[test]
    fn two_missing_names_are_comma_separated() {
        let mut cpu = SimulatedCpu::new(7).with_bits(1, Register::Ecx, &[20]);
        let missing = detect_with(&Catalog::new(&SPECS), &mut cpu);
        assert_eq!(
            render(&missing),
            (
                true,
                "error: This program requires the following extensions, which are not supported by this machine: AVX, BMI2\n".to_string()
            )
        );
    }

    #[test]
    fn single_missing_name_has_no_separator() {
        let mut cpu = SimulatedCpu::new(7)
            .with_bits(1, Register::Ecx, &[28])
            .with_bits(7, Register::Ebx, &[8]);
        let missing = detect_with(&Catalog::new(&SPECS), &mut cpu);
        let (written, text) = render(&missing);
        assert!(written);
        assert_eq!(text.strip_prefix(DIAGNOSTIC_PREFIX), Some("SSE 4.2\n"));
    }

    #[test]
    fn nothing_missing_writes_nothing_and_returns() {
        let mut cpu = SimulatedCpu::new(7)
            .with_bits(1, Register::Ecx, &[20, 28])
            .with_bits(7, Register::Ebx, &[8]);
        let missing = detect_with(&Catalog::new(&SPECS), &mut cpu);
        assert!(!is_any_missing(&missing));
        assert_eq!(render(&missing), (false, String::new()));

        // Would exit the test process if it did anything.
        diagnose(&missing);
    }

    #[test]
    fn empty_catalog_never_reports() {
        let mut cpu = SimulatedCpu::new(0);
        let missing = detect_with(&Catalog::new(&[]), &mut cpu);
        let mut visited = 0;
        for_each_missing(&missing, |_| visited += 1);
        assert_eq!(visited, 0);
        diagnose(&missing);
    }

    #[test]
    fn for_each_missing_visits_in_catalog_order() {
        let mut cpu = SimulatedCpu::new(1);
        let missing = detect_with(&Catalog::new(&SPECS), &mut cpu);
        let mut names = Vec::new();
        for_each_missing(&missing, |name| names.push(name));
        assert_eq!(names, ["AVX", "SSE 4.2", "BMI2"]);
    }
}
