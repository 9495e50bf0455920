//! Startup verification that the running CPU implements the instruction-set
//! extensions this program was compiled to assume.
//!
//! ```text
//! Feature Table (catalog, registry) -> Detector (detect) -> Reporter (report)
//! ```
//!
//! By default the check runs before `main` (see [`startup`]). A failing check
//! prints one line naming every missing extension and exits with
//! [`EXIT_MISSING_EXTENSIONS`].

pub mod catalog;
pub mod console;
pub mod detect;
pub mod error;
pub mod missing;
pub mod registry;
pub mod report;
pub mod startup;

#[cfg(test)]
mod test_fixtures;

pub use catalog::{Catalog, FeatureSpec, MAX_FEATURES, Register};
pub use detect::{CpuidSource, LiveCpu, detect, detect_with};
pub use error::{CatalogError, CatalogResult};
pub use missing::{MissingIter, MissingSet};
pub use registry::{Extension, KNOWN, REQUIRED, resolve_requirement};
pub use report::{
    EXIT_MISSING_EXTENSIONS, diagnose, for_each_missing, is_any_missing, write_diagnostic,
};
pub use startup::{run_startup_check, startup_check, startup_result};
