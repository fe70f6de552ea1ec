//! Progress output for the pipelines
//!
//! Every step is printed with a local timestamp and its duration as it
//! finishes, followed by a summary once the run is over.

use chrono::Local;
use colored::Colorize;
use std::time::{Duration, Instant};
use valkyrie_cloud::{ActionOutcome, ActionResult, TeardownReport};
use valkyrie_core::{PipelineError, ProvisionReport, ProvisionStep, StepObserver};

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Prints step progress to stdout
pub struct ProgressLogger {
    start_time: Instant,
}

impl ProgressLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn print_provision_summary(&self, report: &ProvisionReport) {
        let slowest_step = report.steps.iter().max_by_key(|(_, d)| *d);

        println!();
        println!("{}", "═".repeat(44));
        println!("Environment:   {}", report.environment.cyan().bold());
        println!("{}", "─".repeat(44));
        println!(
            "Total time:    {}",
            format_duration(self.start_time.elapsed()).green()
        );
        if let Some((step, duration)) = slowest_step {
            println!("Slowest step:  {} ({})", step.name(), format_duration(*duration));
        }
        println!("Endpoint:      {}", report.invoke_url.cyan());
        println!("{}", "═".repeat(44));
    }

    pub fn print_teardown_summary(&self, report: &TeardownReport) {
        let summary = report.summary();
        println!();
        println!("{}", "═".repeat(44));
        println!("Teardown:      {}", summary);
        println!(
            "Total time:    {}",
            format_duration(Duration::from_millis(report.duration_ms)).green()
        );
        if summary.failed > 0 {
            println!(
                "Warnings:      {}",
                summary.failed.to_string().yellow().bold()
            );
            for warning in report.warnings() {
                if let ActionOutcome::Failed(message) = &warning.outcome {
                    println!(
                        "  {} [{}] {} {}: {}",
                        "⚠".yellow(),
                        warning.environment,
                        warning.action,
                        warning.resource,
                        message.dimmed()
                    );
                }
            }
        } else {
            println!("Warnings:      {}", "0".green());
        }
        println!("{}", "═".repeat(44));
    }
}

impl Default for ProgressLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StepObserver for ProgressLogger {
    fn step_started(&self, step: ProvisionStep) {
        println!("[{}] {} {}", timestamp().dimmed(), "▶".cyan(), step.name());
    }

    fn step_succeeded(&self, step: ProvisionStep, duration: Duration) {
        println!(
            "[{}] {} {} done ({})",
            timestamp().dimmed(),
            "✓".green().bold(),
            step.name(),
            format_duration(duration).dimmed()
        );
    }

    fn step_failed(&self, step: ProvisionStep, error: &PipelineError) {
        println!(
            "[{}] {} {}: {}",
            timestamp().dimmed(),
            "✗".red().bold(),
            step.name(),
            error.to_string().red()
        );
    }

    fn rollback_started(&self, environment: &str) {
        println!(
            "[{}] {} Reverting {}...",
            timestamp().dimmed(),
            "⟲".yellow(),
            environment.cyan()
        );
    }

    fn action_completed(&self, result: &ActionResult) {
        let (mark, note) = match &result.outcome {
            ActionOutcome::Deleted => ("✓".green().bold(), String::new()),
            ActionOutcome::AlreadyAbsent => ("·".dimmed(), " (already absent)".to_string()),
            ActionOutcome::Failed(message) => ("⚠".yellow(), format!(": {}", message)),
        };
        println!(
            "[{}] {} [{}] {} {}{}",
            timestamp().dimmed(),
            mark,
            result.environment,
            result.action,
            result.resource,
            note.dimmed()
        );
    }
}

/// Format a duration for humans
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        format!("{}m {}s", total_secs / 60, total_secs % 60)
    } else if total_secs >= 1 {
        format!("{}.{}s", total_secs, millis / 100)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }
}
