use crate::output::is_quiet;
use crate::scope::Decision;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::SCOPE, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn section(title: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

/// Icon and colored label for a verdict
pub fn verdict(decision: Decision) -> String {
    let icon = match decision {
        Decision::Include => Icons::INCLUDE,
        Decision::Exclude => Icons::EXCLUDE,
        Decision::NotApplicable => Icons::UNDECIDED,
    };
    format!("{} {}", icon, decision.as_str().style(theme().decision(decision)))
}

pub fn summary_row(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
