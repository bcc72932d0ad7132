pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, section, success, summary_row, verdict};
pub use table::{export_table, stats_table, ExportRow};
pub use theme::{theme, Theme};
