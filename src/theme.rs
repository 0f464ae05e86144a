//! Centralized styling for the first-boot dialogs.
//!
//! Single source of truth for the colors and styles used by the dialog
//! screens, in the spirit of the classic blue first-boot console.

#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

/// Core color palette for the dialogs
pub struct Colors;

impl Colors {
    /// Console backdrop behind every dialog
    pub const BG_BACKDROP: Color = Color::Blue;

    /// Dialog body background
    pub const BG_DIALOG: Color = Color::Rgb(230, 230, 230);

    /// Dialog body text
    pub const FG_DIALOG: Color = Color::Black;

    /// Muted helper text (defaults, key hints)
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Title and border accent
    pub const PRIMARY: Color = Color::Rgb(0, 0, 128);

    /// Selected item / active field accent
    pub const SELECTED_BG: Color = Color::Rgb(0, 0, 128);
    pub const SELECTED_FG: Color = Color::White;

    /// Error dialog accent
    pub const ERROR: Color = Color::Red;
}

/// Pre-built styles for the dialog widgets
pub struct Styles;

impl Styles {
    /// Backdrop fill behind dialogs
    pub fn backdrop() -> Style {
        Style::default().bg(Colors::BG_BACKDROP)
    }

    /// Dialog body
    pub fn dialog() -> Style {
        Style::default().bg(Colors::BG_DIALOG).fg(Colors::FG_DIALOG)
    }

    /// Dialog title
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Input field being edited
    pub fn input() -> Style {
        Style::default()
            .bg(Colors::SELECTED_BG)
            .fg(Colors::SELECTED_FG)
    }

    /// Highlighted menu entry
    pub fn selected() -> Style {
        Style::default()
            .bg(Colors::SELECTED_BG)
            .fg(Colors::SELECTED_FG)
            .add_modifier(Modifier::BOLD)
    }

    /// Error dialog title
    pub fn error_title() -> Style {
        Style::default()
            .fg(Colors::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hints at the bottom of a dialog
    pub fn hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }
}
