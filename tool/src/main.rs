use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use isacheck::console::init_stderr_logging;
use isacheck::{
    Catalog, CatalogResult, Extension, FeatureSpec, KNOWN, detect, diagnose, resolve_requirement,
    run_startup_check,
};
use isacheck_lib::cpu::{CPUID_LEAF_VENDOR, cpuid_count};
use isacheck_lib::klog_debug;

mod config;

use config::{EXIT_USAGE, Mode, USAGE, config_from_args};

// Refuse to run on a machine this binary itself was not built for.
isacheck::startup_hook!();

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let cfg = match config_from_args(&args) {
        Ok(cfg) => cfg,
        Err(err) => return usage_error(&err),
    };

    if let Some(level) = cfg.log_level {
        init_stderr_logging(level);
    }

    match cfg.mode {
        Mode::Help => {
            println!("{}", USAGE);
            ExitCode::SUCCESS
        }
        Mode::List => match list_extensions(&mut io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("isacheck: {}", err);
                ExitCode::FAILURE
            }
        },
        Mode::Check if cfg.requirements.is_empty() => {
            run_startup_check();
            ExitCode::SUCCESS
        }
        Mode::Check => {
            let specs = match resolve_all(&cfg.requirements) {
                Ok(specs) => specs,
                Err(err) => return usage_error(&err),
            };
            let catalog = match Catalog::try_new(&specs) {
                Ok(catalog) => catalog,
                Err(err) => return usage_error(&err),
            };
            klog_debug!("isacheck: checking {} requested extensions", catalog.len());
            diagnose(&detect(&catalog));
            ExitCode::SUCCESS
        }
    }
}

fn resolve_all<'a>(requirements: &[&'a str]) -> CatalogResult<Vec<FeatureSpec<'a>>> {
    requirements
        .iter()
        .copied()
        .map(resolve_requirement)
        .collect()
}

fn usage_error(err: &dyn std::error::Error) -> ExitCode {
    eprintln!("isacheck: {}", err);
    eprintln!("try 'isacheck --help'");
    ExitCode::from(EXIT_USAGE)
}

fn list_extensions(out: &mut impl Write) -> io::Result<()> {
    let leaf0 = cpuid_count(CPUID_LEAF_VENDOR, 0);
    let vendor = leaf0.vendor_id();
    writeln!(
        out,
        "vendor: {} (max basic leaf {:#x})",
        String::from_utf8_lossy(&vendor).trim_end_matches('\0'),
        leaf0.eax
    )?;

    let missing = detect(&KNOWN);
    writeln!(
        out,
        "{:<12} {:<10} {:>4} {:>3} {:>3}  {:<3}  {}",
        "EXTENSION", "IDENT", "LEAF", "REG", "BIT", "CPU", "BUILD"
    )?;
    for (index, ext) in Extension::ALL.iter().enumerate() {
        let spec = ext.spec();
        writeln!(
            out,
            "{:<12} {:<10} {:>#4x} {:>3} {:>3}  {:<3}  {}",
            spec.name(),
            ext.ident(),
            spec.leaf(),
            spec.register(),
            spec.bit(),
            if missing.contains(index) { "no" } else { "yes" },
            if ext.is_required() { "required" } else { "-" }
        )?;
    }
    out.flush()
}
