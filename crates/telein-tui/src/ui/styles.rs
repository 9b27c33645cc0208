use ratatui::style::{Color, Modifier, Style};

use telein_core::NotificationKind;

// Telein palette: brand blue with an orange call-to-action accent
pub const PRIMARY: Color = Color::Rgb(0, 112, 192);
pub const SUCCESS: Color = Color::Rgb(22, 163, 74);
pub const ACCENT: Color = Color::Rgb(245, 130, 32);
pub const ERROR: Color = Color::Rgb(220, 38, 38);
pub const MUTED: Color = Color::Rgb(120, 130, 145);
pub const HIGHLIGHT: Color = Color::Rgb(12, 44, 84);
pub const SURFACE: Color = Color::Rgb(10, 24, 44);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

/// Section headings in the marketing panel.
pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn link_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::UNDERLINED)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(SURFACE).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Toast colour by notification kind
pub fn notification_style(kind: NotificationKind) -> Style {
    let color = match kind {
        NotificationKind::Success => SUCCESS,
        NotificationKind::Info => PRIMARY,
        NotificationKind::Destructive => ERROR,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
