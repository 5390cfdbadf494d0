// relaychat-core/src/markup.rs
//! The tag markup used by chat templates, and its parsed form.
//!
//! Markup is plain text interleaved with tags such as `<red>`, `<#ff8800>`,
//! `<bold>`, `<reset>` and `<click:open_url:'https://example.org'>`. Closing
//! tags (`</red>`) pop the most recent matching open tag. Unknown tags are
//! kept as literal text. `\<` and `\\` escape a literal `<` or `\`.
//!
//! [`escape`] is the inverse of literal rendering: `parse(&escape(s)).plain_text() == s`
//! for any `s`, and no tag inside `s` is ever interpreted.

use serde::{Deserialize, Serialize};

/// The sixteen named chat colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "black" => NamedColor::Black,
            "dark_blue" => NamedColor::DarkBlue,
            "dark_green" => NamedColor::DarkGreen,
            "dark_aqua" => NamedColor::DarkAqua,
            "dark_red" => NamedColor::DarkRed,
            "dark_purple" => NamedColor::DarkPurple,
            "gold" => NamedColor::Gold,
            "gray" | "grey" => NamedColor::Gray,
            "dark_gray" | "dark_grey" => NamedColor::DarkGray,
            "blue" => NamedColor::Blue,
            "green" => NamedColor::Green,
            "aqua" => NamedColor::Aqua,
            "red" => NamedColor::Red,
            "light_purple" => NamedColor::LightPurple,
            "yellow" => NamedColor::Yellow,
            "white" => NamedColor::White,
            _ => return None,
        };
        Some(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextColor {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

impl TextColor {
    /// Parses `red`, `dark_gray` or `#rrggbb`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(TextColor::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        NamedColor::from_name(&value).map(TextColor::Named)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub color: Option<TextColor>,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
}

/// A run of text sharing one style and, optionally, one click-to-open link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub style: Style,
    pub link: Option<String>,
}

/// Parsed markup: an ordered list of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    spans: Vec<Span>,
}

impl Component {
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// The visible text with all styling dropped.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The first span whose text contains `needle`.
    pub fn span_containing(&self, needle: &str) -> Option<&Span> {
        self.spans.iter().find(|s| s.text.contains(needle))
    }

    fn push(&mut self, text: &str, style: &Style, link: &Option<String>) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if &last.style == style && &last.link == link {
                last.text.push_str(text);
                return;
            }
        }
        self.spans.push(Span {
            text: text.to_string(),
            style: style.clone(),
            link: link.clone(),
        });
    }
}

/// Neutralises every tag in `text` so it renders literally.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '<' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// One open tag on the parser stack, with the style and link in effect after it.
struct Frame {
    name: String,
    style: Style,
    link: Option<String>,
}

enum Tag {
    Reset,
    Open(Frame),
    Close(String),
}

fn canonical_decoration(name: &str) -> Option<&'static str> {
    match name {
        "bold" | "b" => Some("bold"),
        "italic" | "i" | "em" => Some("italic"),
        "underlined" | "u" => Some("underlined"),
        "strikethrough" | "st" => Some("strikethrough"),
        "obfuscated" | "obf" => Some("obfuscated"),
        _ => None,
    }
}

fn unquote(value: &str) -> &str {
    let v = value.trim();
    for q in ['\'', '"'] {
        if let Some(inner) = v.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    v
}

/// Interprets the inside of `<...>`. Returns `None` for tags that must stay literal.
fn interpret_tag(content: &str, current: &Style, link: &Option<String>) -> Option<Tag> {
    if let Some(closing) = content.strip_prefix('/') {
        let name = closing.split(':').next().unwrap_or_default().to_ascii_lowercase();
        let name = canonical_decoration(&name).map(str::to_string).unwrap_or(name);
        return if name.is_empty() { None } else { Some(Tag::Close(name)) };
    }

    let mut parts = content.splitn(3, ':');
    let head = parts.next().unwrap_or_default().to_ascii_lowercase();
    let mut style = current.clone();
    let mut frame_link = link.clone();

    let name = if head == "reset" {
        return Some(Tag::Reset);
    } else if let Some(decoration) = canonical_decoration(&head) {
        match decoration {
            "bold" => style.bold = true,
            "italic" => style.italic = true,
            "underlined" => style.underlined = true,
            "strikethrough" => style.strikethrough = true,
            _ => style.obfuscated = true,
        }
        decoration.to_string()
    } else if head == "color" || head == "colour" || head == "c" {
        style.color = Some(TextColor::parse(parts.next()?)?);
        head
    } else if head == "click" {
        let action = parts.next()?.to_ascii_lowercase();
        if action != "open_url" {
            return None;
        }
        let url = unquote(parts.next()?);
        if url.is_empty() {
            return None;
        }
        frame_link = Some(url.to_string());
        head
    } else {
        style.color = Some(TextColor::parse(content)?);
        head
    };

    Some(Tag::Open(Frame {
        name,
        style,
        link: frame_link,
    }))
}

/// Parses markup into styled spans.
pub fn parse(markup: &str) -> Component {
    let mut component = Component::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut buffer = String::new();
    let mut rest = markup;

    let base_style = Style::default();
    let no_link: Option<String> = None;

    while let Some(c) = rest.chars().next() {
        let (style, link) = stack
            .last()
            .map(|f| (&f.style, &f.link))
            .unwrap_or((&base_style, &no_link));

        if c == '\\' {
            let mut chars = rest[1..].chars();
            match chars.next() {
                Some(next @ ('<' | '\\')) => {
                    buffer.push(next);
                    rest = &rest[1 + next.len_utf8()..];
                }
                _ => {
                    buffer.push('\\');
                    rest = &rest[1..];
                }
            }
            continue;
        }

        if c == '<' {
            let after = &rest[1..];
            let close = after.find('>');
            let nested = after.find('<');
            if let Some(end) = close.filter(|end| nested.map_or(true, |n| n > *end)) {
                let content = &after[..end];
                if let Some(tag) = interpret_tag(content, style, link) {
                    component.push(&buffer, style, link);
                    buffer.clear();
                    match tag {
                        Tag::Reset => stack.clear(),
                        Tag::Open(frame) => stack.push(frame),
                        Tag::Close(name) => match stack.iter().rposition(|f| f.name == name) {
                            Some(pos) => stack.truncate(pos),
                            None => {
                                buffer.push('<');
                                buffer.push_str(content);
                                buffer.push('>');
                            }
                        },
                    }
                    rest = &after[end + 1..];
                    continue;
                }
            }
        }

        buffer.push(c);
        rest = &rest[c.len_utf8()..];
    }

    let (style, link) = stack
        .last()
        .map(|f| (&f.style, &f.link))
        .unwrap_or((&base_style, &no_link));
    component.push(&buffer, style, link);
    component
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Option<TextColor> {
        Some(TextColor::Named(NamedColor::Red))
    }

    #[test]
    fn parses_colors_and_decorations() {
        let c = parse("<red>hi <bold>there</bold> you</red>!");
        assert_eq!(c.plain_text(), "hi there you!");
        let spans = c.spans();
        assert_eq!(spans[0].style.color, red());
        assert!(spans[1].style.bold && spans[1].style.color == red());
        assert!(!spans[2].style.bold);
        assert_eq!(spans[3].style, Style::default());
    }

    #[test]
    fn hex_and_color_prefix() {
        let c = parse("<#FF8800>a<color:dark_gray>b");
        assert_eq!(c.spans()[0].style.color, Some(TextColor::Rgb(0xff, 0x88, 0x00)));
        assert_eq!(c.spans()[1].style.color, Some(TextColor::Named(NamedColor::DarkGray)));
    }

    #[test]
    fn reset_clears_everything() {
        let c = parse("<gold><b>x<reset>y");
        assert_eq!(c.spans()[1].text, "y");
        assert_eq!(c.spans()[1].style, Style::default());
    }

    #[test]
    fn unknown_and_unbalanced_tags_stay_literal() {
        assert_eq!(parse("a <player> b").plain_text(), "a <player> b");
        assert_eq!(parse("1 < 2 > 0").plain_text(), "1 < 2 > 0");
        assert_eq!(parse("x</red>").plain_text(), "x</red>");
        assert_eq!(parse("<<red>x").plain_text(), "<x");
    }

    #[test]
    fn escape_makes_tags_literal() {
        let raw = r"<red>hi</red> \o/ <click:open_url:'http://x'>";
        let c = parse(&escape(raw));
        assert_eq!(c.plain_text(), raw);
        assert!(c.spans().iter().all(|s| s.style == Style::default() && s.link.is_none()));
    }

    #[test]
    fn click_tag_sets_link() {
        let c = parse("see <click:open_url:'https://example.org'>https://example.org</click> now");
        let link = c.span_containing("example").unwrap();
        assert_eq!(link.link.as_deref(), Some("https://example.org"));
        assert!(c.span_containing("now").unwrap().link.is_none());
    }
}
