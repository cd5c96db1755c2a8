//! Inline style markup applied after template substitution
//!
//! The reference syntax is `{style.style text}`: a brace, a dot-separated
//! style chain, one space, the styled text and a closing brace. Blocks may
//! nest up to [`MAX_NESTING`] levels. A block naming an unknown style is not
//! markup and stays verbatim, which keeps JSON fragments such as `{"id":1}`
//! intact.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// ANSI escape sequences (CSI and friends)
static ANSI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x1b\x{9b}][\[()#;?]*(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-ORZcf-nqry=><]")
        .expect("ANSI pattern is valid")
});

/// Remove ANSI escape sequences
pub fn strip_ansi(text: &str) -> String {
    ANSI.replace_all(text, "").into_owned()
}

/// Decoration stage run on every formatted message
pub trait Markup: Send + Sync {
    /// Turn text with inline markers into display text
    fn render(&self, text: &str) -> String;

    /// Derive plain text from a rendered string
    fn strip(&self, rendered: &str) -> String {
        strip_ansi(rendered)
    }
}

/// Leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkup;

impl Markup for PlainMarkup {
    fn render(&self, text: &str) -> String {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tint {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Tint {
    fn parse(name: &str) -> Option<Tint> {
        let (base, bright) = match name.strip_suffix("bright") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let tint = match (base, bright) {
            ("gray" | "grey", false) => Tint::BrightBlack,
            ("black", false) => Tint::Black,
            ("black", true) => Tint::BrightBlack,
            ("red", false) => Tint::Red,
            ("red", true) => Tint::BrightRed,
            ("green", false) => Tint::Green,
            ("green", true) => Tint::BrightGreen,
            ("yellow", false) => Tint::Yellow,
            ("yellow", true) => Tint::BrightYellow,
            ("blue", false) => Tint::Blue,
            ("blue", true) => Tint::BrightBlue,
            ("magenta", false) => Tint::Magenta,
            ("magenta", true) => Tint::BrightMagenta,
            ("cyan", false) => Tint::Cyan,
            ("cyan", true) => Tint::BrightCyan,
            ("white", false) => Tint::White,
            ("white", true) => Tint::BrightWhite,
            _ => return None,
        };
        Some(tint)
    }

    #[cfg(feature = "console")]
    fn color(self) -> colored::Color {
        use colored::Color;
        match self {
            Tint::Black => Color::Black,
            Tint::Red => Color::Red,
            Tint::Green => Color::Green,
            Tint::Yellow => Color::Yellow,
            Tint::Blue => Color::Blue,
            Tint::Magenta => Color::Magenta,
            Tint::Cyan => Color::Cyan,
            Tint::White => Color::White,
            Tint::BrightBlack => Color::BrightBlack,
            Tint::BrightRed => Color::BrightRed,
            Tint::BrightGreen => Color::BrightGreen,
            Tint::BrightYellow => Color::BrightYellow,
            Tint::BrightBlue => Color::BrightBlue,
            Tint::BrightMagenta => Color::BrightMagenta,
            Tint::BrightCyan => Color::BrightCyan,
            Tint::BrightWhite => Color::BrightWhite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Fg(Tint),
    Bg(Tint),
    Bold,
    Dim,
    Italic,
    Underline,
    Inverse,
    Strikethrough,
}

impl Style {
    /// Names follow chalk: `red`, `redBright`, `bgRed`, `bold`, ...
    fn parse(name: &str) -> Option<Style> {
        let lower = name.to_ascii_lowercase();
        let style = match lower.as_str() {
            "bold" => Style::Bold,
            "dim" => Style::Dim,
            "italic" => Style::Italic,
            "underline" => Style::Underline,
            "inverse" => Style::Inverse,
            "strikethrough" => Style::Strikethrough,
            other => match other.strip_prefix("bg") {
                Some(bg) => Style::Bg(Tint::parse(bg)?),
                None => Style::Fg(Tint::parse(other)?),
            },
        };
        Some(style)
    }
}

/// Deepest block nesting that is still styled; deeper blocks stay verbatim
pub const MAX_NESTING: usize = 32;

/// Pair every `{` with its closing `}` in one pass
fn match_braces(text: &str) -> HashMap<usize, usize> {
    let mut open = Vec::new();
    let mut pairs = HashMap::new();
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    pairs.insert(start, i);
                }
            }
            _ => {}
        }
    }
    pairs
}

/// Style chain of a block opening at `open`, and the offset of its text
fn parse_header(text: &str, open: usize) -> Option<(Vec<Style>, usize)> {
    let after = &text[open + 1..];
    let chain_len = after
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '.'))
        .unwrap_or(after.len());
    if !after[chain_len..].starts_with(' ') {
        return None;
    }
    let styles = after[..chain_len]
        .split('.')
        .map(Style::parse)
        .collect::<Option<Vec<_>>>()?;
    Some((styles, open + chain_len + 2))
}

/// A block being rendered
struct Frame {
    styles: Vec<Style>,
    text: String,
    close: usize,
}

/// Brace-block markup rendered with terminal colors
///
/// # Example
///
/// ```
/// use pipelog::{BraceMarkup, Markup};
///
/// let markup = BraceMarkup::with_colors(false);
/// assert_eq!(markup.render("done {green.bold ok}"), "done ok");
/// assert_eq!(markup.render(r#"{"id":1}"#), r#"{"id":1}"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BraceMarkup {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
}

impl BraceMarkup {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn render_blocks(&self, text: &str) -> String {
        let closes = match_braces(text);
        let mut out = String::with_capacity(text.len());
        let mut frames: Vec<Frame> = Vec::new();
        let mut pos = 0;

        while let Some(c) = text[pos..].chars().next() {
            if matches!(frames.last(), Some(frame) if frame.close == pos) {
                if let Some(frame) = frames.pop() {
                    let styled = self.apply(&frame.styles, frame.text);
                    match frames.last_mut() {
                        Some(parent) => parent.text.push_str(&styled),
                        None => out.push_str(&styled),
                    }
                }
                pos += 1;
                continue;
            }

            if c == '{' && frames.len() < MAX_NESTING {
                if let Some(&close) = closes.get(&pos) {
                    if let Some((styles, start)) = parse_header(text, pos) {
                        frames.push(Frame {
                            styles,
                            text: String::new(),
                            close,
                        });
                        pos = start;
                        continue;
                    }
                }
            }

            match frames.last_mut() {
                Some(frame) => frame.text.push(c),
                None => out.push(c),
            }
            pos += c.len_utf8();
        }
        out
    }

    #[cfg(feature = "console")]
    fn apply(&self, styles: &[Style], text: String) -> String {
        use colored::Colorize;

        if !self.use_colors {
            return text;
        }
        styles
            .iter()
            .fold(text.as_str().normal(), |styled, style| match *style {
                Style::Fg(tint) => styled.color(tint.color()),
                Style::Bg(tint) => styled.on_color(tint.color()),
                Style::Bold => styled.bold(),
                Style::Dim => styled.dimmed(),
                Style::Italic => styled.italic(),
                Style::Underline => styled.underline(),
                Style::Inverse => styled.reversed(),
                Style::Strikethrough => styled.strikethrough(),
            })
            .to_string()
    }

    #[cfg(not(feature = "console"))]
    fn apply(&self, _styles: &[Style], text: String) -> String {
        text
    }
}

impl Default for BraceMarkup {
    fn default() -> Self {
        Self::new()
    }
}

impl Markup for BraceMarkup {
    fn render(&self, text: &str) -> String {
        self.render_blocks(text)
    }
}
