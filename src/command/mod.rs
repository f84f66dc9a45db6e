mod check;
mod list;
mod run;
mod status;
mod use_default;

pub use check::run_check;
pub use list::run_list;
pub use run::run_run;
pub use status::run_status;
pub use use_default::run_use;

use crate::validate::ValidationReport;

/// Print a validation report the way every command surface does.
pub(crate) fn print_report(report: &ValidationReport) {
    for error in &report.errors {
        println!("❌ {}", error);
    }
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }
}
