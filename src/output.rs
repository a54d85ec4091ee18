use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Whether decorative output (banners, hints) should be suppressed.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("STOCKTRACK_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// Format a quantity the way the entry form reports it ("Used: 4.20").
pub fn format_qty(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_qty() {
        assert_eq!(format_qty(4.2), "4.20");
        assert_eq!(format_qty(-1.0), "-1.00");
        assert_eq!(format_qty(250.0), "250.00");
    }
}
