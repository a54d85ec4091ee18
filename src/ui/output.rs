use crate::output::{format_qty, is_quiet};
use crate::ui::theme::Tone;
use crate::ui::{theme, Icons};

pub fn header(icon: &str, text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", icon, theme().paint(Tone::Header, text));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, dim(label), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, theme().paint(Tone::Success, label));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, theme().paint(Tone::Error, label));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, theme().paint(Tone::Warn, label));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", theme().paint(Tone::Info, Icons::INFO), dim(label), value);
}

pub fn section(title: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("━{}━", theme().paint(Tone::Header, title));
}

pub fn dim(text: &str) -> String {
    theme().paint(Tone::Dim, text)
}

/// A quantity with two decimals, highlighted when negative
pub fn qty(value: f64) -> String {
    let text = format_qty(value);
    if value < 0.0 {
        theme().paint(Tone::Negative, &text)
    } else {
        text
    }
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", dim(label), value);
}
