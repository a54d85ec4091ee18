use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// What a piece of terminal text means, independent of how it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Success,
    Error,
    Warn,
    Info,
    Dim,
    /// Used quantities below zero (over-counted closing, waste beyond supply)
    Negative,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    colored: bool,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Color only when stdout is a terminal and NO_COLOR/CLICOLOR allow it
    pub fn detect() -> Self {
        Self::new(console::Term::stdout().is_term() && console::colors_enabled())
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn style(&self, tone: Tone) -> Style {
        if !self.colored {
            return Style::new();
        }
        match tone {
            Tone::Header => Style::new().cyan().bold(),
            Tone::Success => Style::new().green().bold(),
            Tone::Error => Style::new().red().bold(),
            Tone::Warn => Style::new().yellow().bold(),
            Tone::Info => Style::new().magenta(),
            Tone::Dim => Style::new().white().dimmed(),
            Tone::Negative => Style::new().red(),
        }
    }

    pub fn paint(&self, tone: Tone, text: &str) -> String {
        self.style(tone).style(text).to_string()
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_leaves_text_alone() {
        let plain = Theme::new(false);
        assert!(!plain.is_colored());
        assert_eq!(plain.paint(Tone::Negative, "-2.00"), "-2.00");
        assert_eq!(plain.paint(Tone::Header, "Items"), "Items");
    }

    #[test]
    fn test_colored_theme_wraps_text() {
        let colored = Theme::new(true);
        let painted = colored.paint(Tone::Negative, "-2.00");
        assert!(painted.contains("-2.00"));
        assert!(painted.starts_with("\u{1b}["));
        assert_ne!(colored.paint(Tone::Success, "ok"), colored.paint(Tone::Error, "ok"));
    }
}
