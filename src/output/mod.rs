//! Output module for console output, progress and reports.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Statistics reporting
//! - JSON result reports

pub mod console;
pub mod progress;
pub mod report;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
};
pub use progress::create_item_bar;
pub use report::write_report;
pub use stats::print_batch_stats;
