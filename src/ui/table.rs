use tabled::{settings::Style, Table, Tabled};

use crate::catalog::CatalogStats;

/// One export line in `resolve` / `explain` output
#[derive(Tabled)]
pub struct ExportRow {
    #[tabled(rename = "Contract")]
    pub contract: String,
    #[tabled(rename = "Target")]
    pub target: String,
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Verdict")]
    pub verdict: String,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn export_table(rows: &[ExportRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &CatalogStats) -> String {
    let rows = [
        ("Assemblies", stats.assemblies),
        ("Types", stats.types),
        ("Members", stats.members),
        ("Parts", stats.parts),
        ("Exports", stats.exports),
        ("Scopes", stats.scopes),
    ]
    .into_iter()
    .map(|(metric, value)| StatRow {
        metric: metric.to_string(),
        value: value.to_string(),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_export_table() {
        assert!(export_table(&[]).is_empty());
    }

    #[test]
    fn test_stats_table_lists_metrics() {
        let stats = CatalogStats {
            assemblies: 1,
            types: 4,
            members: 2,
            parts: 3,
            exports: 5,
            scopes: 2,
        };
        let table = stats_table(&stats);
        assert!(table.contains("Assemblies"));
        assert!(table.contains("Exports"));
        assert!(table.contains('5'));
    }
}
