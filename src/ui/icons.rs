pub struct Icons;

impl Icons {
    pub const BOX: &str = "📦";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const DATABASE: &str = "🗄️";
    pub const CALENDAR: &str = "📅";
    pub const INBOX: &str = "📥";
    pub const EDIT: &str = "✏️";
    pub const DEL: &str = "🗑️";
    pub const MONEY: &str = "💰";
    pub const GEAR: &str = "⚙️";
}
