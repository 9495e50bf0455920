use core::fmt;

use isacheck_lib::klog::KlogLevel;

/// Exit status for malformed command lines and requirement lists.
pub const EXIT_USAGE: u8 = 2;

pub const USAGE: &str = "\
usage: isacheck [--list] [--log=LEVEL] [REQUIREMENT...]

Check that this machine implements the given instruction-set extensions.
With no REQUIREMENT, check the extensions this binary was built to assume.

REQUIREMENT  extension name (avx, sse4.2, bmi2, ...) or NAME:LEAF:REG:BIT
--list       print every known extension and whether this CPU has it
--log=LEVEL  log to stderr at error, warn, info, debug or trace
-h, --help   print this message

Exit status: 0 all present, 1 extensions missing, 2 usage error.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Check,
    List,
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ToolConfig<'a> {
    pub mode: Mode,
    pub log_level: Option<KlogLevel>,
    pub requirements: Vec<&'a str>,
}

impl Default for ToolConfig<'_> {
    fn default() -> Self {
        Self {
            mode: Mode::Check,
            log_level: None,
            requirements: Vec::new(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgError {
    UnknownOption(String),
    InvalidLogLevel(String),
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOption(opt) => write!(f, "unknown option '{}'", opt),
            Self::InvalidLogLevel(level) => write!(f, "invalid log level '{}'", level),
        }
    }
}

impl std::error::Error for ArgError {}

pub fn config_from_args(args: &[String]) -> Result<ToolConfig<'_>, ArgError> {
    let mut cfg = ToolConfig::default();
    let mut options_done = false;

    for arg in args {
        let arg = arg.as_str();
        if options_done || !arg.starts_with('-') {
            cfg.requirements.push(arg);
        } else if arg == "--" {
            options_done = true;
        } else if arg == "--list" {
            if cfg.mode != Mode::Help {
                cfg.mode = Mode::List;
            }
        } else if arg == "--help" || arg == "-h" {
            cfg.mode = Mode::Help;
        } else if let Some(value) = arg.strip_prefix("--log=") {
            let level =
                KlogLevel::from_name(value).ok_or_else(|| ArgError::InvalidLogLevel(value.into()))?;
            cfg.log_level = Some(level);
        } else {
            return Err(ArgError::UnknownOption(arg.into()));
        }
    }

    Ok(cfg)
}
