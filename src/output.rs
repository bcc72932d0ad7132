//! Output switches - Environment toggles for human-readable output
//!
//! Set `PARTSCOPE_QUIET=1` (or `true`) to silence headers, tables and
//! summaries. Errors and JSON output are always printed.

use std::sync::OnceLock;

const QUIET_VAR: &str = "PARTSCOPE_QUIET";

static QUIET: OnceLock<bool> = OnceLock::new();

/// Read once per process
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| quiet_from(std::env::var(QUIET_VAR).ok().as_deref()))
}

fn quiet_from(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_values() {
        assert!(quiet_from(Some("1")));
        assert!(quiet_from(Some("TRUE")));
        assert!(!quiet_from(Some("0")));
        assert!(!quiet_from(None));
    }
}
