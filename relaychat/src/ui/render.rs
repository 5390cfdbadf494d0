// relaychat/src/ui/render.rs
//! Renders parsed chat markup to the terminal.
//!
//! Named chat colours map onto the sixteen ANSI colours, hex colours use
//! truecolor escapes. Links are underlined; obfuscated text has no terminal
//! equivalent and is printed as is.

use owo_colors::{AnsiColors, OwoColorize, Style as AnsiStyle};
use relaychat_core::markup::{self, Component, NamedColor, Span, TextColor};

fn ansi_for(color: NamedColor) -> AnsiColors {
    match color {
        NamedColor::Black => AnsiColors::Black,
        NamedColor::DarkBlue => AnsiColors::Blue,
        NamedColor::DarkGreen => AnsiColors::Green,
        NamedColor::DarkAqua => AnsiColors::Cyan,
        NamedColor::DarkRed => AnsiColors::Red,
        NamedColor::DarkPurple => AnsiColors::Magenta,
        NamedColor::Gold => AnsiColors::Yellow,
        NamedColor::Gray => AnsiColors::White,
        NamedColor::DarkGray => AnsiColors::BrightBlack,
        NamedColor::Blue => AnsiColors::BrightBlue,
        NamedColor::Green => AnsiColors::BrightGreen,
        NamedColor::Aqua => AnsiColors::BrightCyan,
        NamedColor::Red => AnsiColors::BrightRed,
        NamedColor::LightPurple => AnsiColors::BrightMagenta,
        NamedColor::Yellow => AnsiColors::BrightYellow,
        NamedColor::White => AnsiColors::BrightWhite,
    }
}

fn ansi_style(span: &Span) -> AnsiStyle {
    let mut style = AnsiStyle::new();
    style = match span.style.color {
        Some(TextColor::Named(named)) => style.color(ansi_for(named)),
        Some(TextColor::Rgb(r, g, b)) => style.truecolor(r, g, b),
        None => style,
    };
    if span.style.bold {
        style = style.bold();
    }
    if span.style.italic {
        style = style.italic();
    }
    if span.style.underlined || span.link.is_some() {
        style = style.underline();
    }
    if span.style.strikethrough {
        style = style.strikethrough();
    }
    style
}

/// Renders a parsed component, with ANSI styling if `color` is set.
pub fn render_component(component: &Component, color: bool) -> String {
    if !color {
        return component.plain_text();
    }
    component
        .spans()
        .iter()
        .map(|span| span.text.style(ansi_style(span)).to_string())
        .collect()
}

/// Parses and renders formatted markup.
pub fn render_markup(formatted: &str, color: bool) -> String {
    render_component(&markup::parse(formatted), color)
}

/// Links found in formatted markup, in order.
pub fn links(formatted: &str) -> Vec<String> {
    markup::parse(formatted)
        .spans()
        .iter()
        .filter_map(|s| s.link.clone())
        .collect()
}
