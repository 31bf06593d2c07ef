//! Statistics reporting.

use console::style;

use crate::download::BatchStats;

/// Print statistics for a batch run.
pub fn print_batch_stats(stats: &BatchStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Statistics:").bold());
    println!("  Saved:      {}", style(stats.saved_count).green());
    for (full_type_info, count) in &stats.by_type {
        println!("    {:<24} {}", full_type_info, count);
    }
    println!("  Not parsed: {}", style(stats.not_parsed_count).yellow());
    if stats.error_count > 0 {
        println!("  Failed:     {}", style(stats.error_count).red());
    }
    println!("  Total:      {}", stats.total());
    println!("{}", style("═".repeat(50)).dim());
}
