use ansi_term::{Colour, Style};
use rust_decimal::Decimal;

/// Applies terminal styles unless colours are disabled.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn paint(&self, style: Style, text: impl AsRef<str>) -> String {
        if self.enabled {
            style.paint(text.as_ref()).to_string()
        } else {
            text.as_ref().to_owned()
        }
    }

    pub fn heading(&self, text: impl AsRef<str>) -> String {
        self.paint(Style::new().bold().underline(), text)
    }

    pub fn dim(&self, text: impl AsRef<str>) -> String {
        self.paint(Style::new().dimmed(), text)
    }

    pub fn good(&self, text: impl AsRef<str>) -> String {
        self.paint(Colour::Green.normal(), text)
    }

    pub fn warn(&self, text: impl AsRef<str>) -> String {
        self.paint(Colour::Yellow.normal(), text)
    }

    pub fn bad(&self, text: impl AsRef<str>) -> String {
        self.paint(Colour::Red.normal(), text)
    }

    /// Positive amounts in green, negative in red.
    pub fn signed_money(&self, amount: Decimal) -> String {
        let text = format_money(amount);
        if amount.is_sign_negative() && !amount.is_zero() {
            self.bad(text)
        } else {
            self.good(text)
        }
    }
}

/// Money is always shown with two decimals.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

pub fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Text cut to `width` characters with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut cut = text.chars().take(width.saturating_sub(1)).collect::<String>();
    cut.push('…');
    cut
}
