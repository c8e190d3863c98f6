pub mod aggregate;
pub mod cache;
pub mod config;
pub mod report;
pub mod stats;
pub mod walk;

use colored::Colorize;

pub use aggregate::Aggregator;
pub use cache::ArtifactCache;
pub use config::RunConfig;
pub use report::{Report, ReportFormat};
pub use stats::{PatchStats, parse_diffstat};
pub use walk::{BugRecord, WalkOptions, WalkOutcome, Walker};

pub fn print_banner() {
    println!(
        "{} {}",
        "patchwalk".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!("{}", "bug dependency trees, measured in lines".dimmed());
    println!();
}
