//! Output formatting and styling module.
//!
//! Every line the CLI prints for a human goes through `OutputFormatter`, so
//! colors, symbols and table layout are decided in one place. Diagnostics for
//! debugging go through `tracing` instead.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - A progress bar while files are processed
/// - A per-folder summary table
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// OutputFormatter::success("Report generated: sorting_report.csv");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[dry-run] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// Lines printed while the bar is active should go through
    /// `ProgressBar::println` so they do not tear the bar.
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(3);
    /// pb.println("Moved a.jpg -> Images/a.jpg");
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Formats the line printed for one moved (or would-be moved) file.
    pub fn move_line(file_name: &str, destination: &str, dry_run: bool) -> String {
        if dry_run {
            format!(
                "{} Would move {} -> {}",
                "[dry-run]".yellow(),
                file_name,
                destination.bold()
            )
        } else {
            format!("{} Moved {} -> {}", "✓".green(), file_name, destination.bold())
        }
    }

    /// Formats the line printed for a skipped file.
    pub fn excluded_line(file_name: &str) -> String {
        format!("{} Skipping (excluded): {}", "-".dimmed(), file_name)
    }

    /// Prints a summary table with file counts by destination folder.
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = folder_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // "Folder"

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
