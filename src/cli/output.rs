//! Operator-facing text for the `run` and `check` commands.

use std::fmt::Display;

const RULE_WIDTH: usize = 56;

/// Print a blank line, a section title, and a rule under it.
pub fn section(title: &str) {
    println!("\n{title}\n{}", "─".repeat(RULE_WIDTH));
}

/// Print one aligned `label value` line.
pub fn field(label: &str, value: impl Display) {
    println!("{label:<18} {value}");
}

fn status(mark: char, message: &str) {
    println!("{mark} {message}");
}

pub fn ok(message: &str) {
    status('✓', message);
}

pub fn warn(message: &str) {
    status('⚠', message);
}

/// Print a rendered table indented by two spaces.
pub fn table(rendered: &str) {
    rendered.lines().for_each(|line| println!("  {line}"));
}
