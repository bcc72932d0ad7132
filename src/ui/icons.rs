pub struct Icons;

impl Icons {
    pub const SCOPE: &str = "🔭";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const STATS: &str = "📊";
    pub const PACKAGE: &str = "📦";
    pub const INCLUDE: &str = "🟢";
    pub const EXCLUDE: &str = "🔴";
    pub const UNDECIDED: &str = "⚪";
    pub const PARENT: &str = "⬆️";
}
