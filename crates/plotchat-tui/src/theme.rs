//! Static styles, built once per process.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub header_title: Style,
    pub header_subtitle: Style,
    pub user_border: Style,
    pub user_label: Style,
    pub bot_border: Style,
    pub bot_label: Style,
    pub timestamp: Style,
    pub placeholder: Style,
    pub typing_dot_on: Style,
    pub typing_dot_off: Style,
    pub input_active: Style,
    pub input_idle: Style,
    pub input_disabled: Style,
    pub chart_border: Style,
    pub axis: Style,
    pub line_series: Style,
    pub scatter_series: Style,
    pub bar: Style,
    pub bar_value: Style,
    pub key: Style,
    pub key_label: Style,
    pub mode_normal: Style,
    pub mode_editing: Style,
}

static THEME: OnceLock<Theme> = OnceLock::new();

pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme {
        header_title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        header_subtitle: Style::default().fg(Color::DarkGray),
        user_border: Style::default().fg(Color::Blue),
        user_label: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        bot_border: Style::default().fg(Color::Magenta),
        bot_label: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        timestamp: Style::default().fg(Color::DarkGray),
        placeholder: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        typing_dot_on: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        typing_dot_off: Style::default().fg(Color::DarkGray),
        input_active: Style::default().fg(Color::Yellow),
        input_idle: Style::default().fg(Color::DarkGray),
        input_disabled: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
        chart_border: Style::default().fg(Color::DarkGray),
        axis: Style::default().fg(Color::Gray),
        line_series: Style::default().fg(Color::Blue),
        scatter_series: Style::default().fg(Color::Green),
        bar: Style::default().fg(Color::Magenta),
        bar_value: Style::default().fg(Color::Black).bg(Color::Magenta),
        // Dark background with bright text for visibility on both light/dark terminals
        key: Style::default().bg(Color::DarkGray).fg(Color::White),
        key_label: Style::default().bg(Color::Black).fg(Color::White),
        mode_normal: Style::default().bg(Color::Blue).fg(Color::White),
        mode_editing: Style::default().bg(Color::Yellow).fg(Color::Black),
    })
}
