//! Terminal colours for output fields.

use colored::Colorize;
use strum::{Display, EnumString};

/// A colour accepted by the `--color-*` flags.
///
/// The dark variants are the plain ANSI colours; the others are their bold
/// counterparts. `white` leaves text as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Color {
    /// ANSI red.
    DarkRed,
    /// Bold red.
    Red,
    /// ANSI green.
    DarkGreen,
    /// Bold green.
    Green,
    /// ANSI blue.
    DarkBlue,
    /// Bold blue.
    Blue,
    /// ANSI magenta.
    DarkMagenta,
    /// Bold magenta.
    Magenta,
    /// No colour.
    White,
}

impl Color {
    /// Wraps `text` in this colour's escape sequences.
    pub(crate) fn paint(self, text: &str) -> String {
        match self {
            Self::DarkRed => text.red().to_string(),
            Self::Red => text.red().bold().to_string(),
            Self::DarkGreen => text.green().to_string(),
            Self::Green => text.green().bold().to_string(),
            Self::DarkBlue => text.blue().to_string(),
            Self::Blue => text.blue().bold().to_string(),
            Self::DarkMagenta => text.magenta().to_string(),
            Self::Magenta => text.magenta().bold().to_string(),
            Self::White => text.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn names_are_kebab_case() {
        assert_eq!(Color::from_str("dark-magenta"), Ok(Color::DarkMagenta));
        assert_eq!(Color::DarkGreen.to_string(), "dark-green");
        assert!(Color::from_str("pink").is_err());
    }

    #[test]
    fn white_is_uncoloured() {
        assert_eq!(Color::White.paint("main.go"), "main.go");
    }

    #[test]
    fn colours_wrap_text_in_escapes() {
        colored::control::set_override(true);
        let painted = Color::Red.paint("x");
        assert!(painted.starts_with("\u{1b}["), "{painted:?}");
        assert!(painted.contains('x'));
        assert!(painted.ends_with("\u{1b}[0m"), "{painted:?}");
    }
}
