//! links.rs - Turns bare URLs in formatted markup into click-to-open links.
//!
//! Runs after template expansion, so it sees markup rather than raw text. A
//! match is cut short at the first `<`, `>` or escaped `\<`, which keeps
//! neighbouring tags out of the link. Escaped backslashes stay part of the URL
//! and are unescaped in the link target.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::Regex;

use crate::errors::RelayError;

const CLICK_PREFIXES: &[&str] = &["open_url:", "open_url:'", "open_url:\""];

#[derive(Debug, Clone)]
pub struct LinkRewriter {
    pattern: Regex,
}

impl LinkRewriter {
    pub fn new(pattern: &str) -> Result<Self, RelayError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| RelayError::RuleCompilationError(pattern.to_string(), e))?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Wraps every URL in `<click:open_url:'url'>url</click>`.
    ///
    /// URLs that already sit inside a click tag are left alone.
    pub fn rewrite(&self, markup: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut last_end = 0;
        let mut linked = 0usize;

        for m in self.pattern.find_iter(markup) {
            let (len, target) = trim_url(m.as_str());
            if len == 0 || m.start() < last_end {
                continue;
            }
            let before = &markup[..m.start()];
            if CLICK_PREFIXES.iter().any(|p| before.ends_with(p)) {
                continue;
            }

            let end = m.start() + len;
            out.push_str(&markup[last_end..m.start()]);
            out.push_str("<click:open_url:'");
            out.push_str(&target);
            out.push_str("'>");
            out.push_str(&markup[m.start()..end]);
            out.push_str("</click>");
            last_end = end;
            linked += 1;
        }

        if linked == 0 {
            return markup.to_string();
        }
        out.push_str(&markup[last_end..]);
        debug!("Linked {} URL(s) in formatted message.", linked);
        out
    }
}

/// Returns the markup length of the URL and its unescaped link target.
fn trim_url(candidate: &str) -> (usize, String) {
    let mut target = String::with_capacity(candidate.len());
    let mut chars = candidate.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '<' | '>' => return (i, target),
            '\\' => match chars.peek() {
                Some((_, '<')) => return (i, target),
                Some((_, '\\')) => {
                    target.push('\\');
                    chars.next();
                }
                _ => target.push('\\'),
            },
            _ => target.push(c),
        }
    }
    (candidate.len(), target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    fn rewriter() -> LinkRewriter {
        LinkRewriter::new(r"https?://\S+").unwrap()
    }

    #[test]
    fn wraps_bare_urls() {
        let out = rewriter().rewrite("see https://example.org now");
        assert_eq!(out, "see <click:open_url:'https://example.org'>https://example.org</click> now");
        let c = parse(&out);
        assert_eq!(c.plain_text(), "see https://example.org now");
        assert_eq!(c.span_containing("example").unwrap().link.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn stops_at_markup_characters() {
        let out = rewriter().rewrite(r"https://a.io/x\<b> and http://b.io<reset>");
        let c = parse(&out);
        assert_eq!(c.plain_text(), "https://a.io/x<b> and http://b.io");
        let links: Vec<_> = c.spans().iter().filter_map(|s| s.link.clone()).collect();
        assert_eq!(links, vec!["https://a.io/x".to_string(), "http://b.io".to_string()]);
    }

    #[test]
    fn backslashes_stay_in_the_link() {
        let c = parse(&rewriter().rewrite(r"go https://x.io/a\b now"));
        assert_eq!(c.plain_text(), r"go https://x.io/a\b now");
        let link = c.span_containing("x.io").unwrap();
        assert_eq!(link.text, r"https://x.io/a\b");
        assert_eq!(link.link.as_deref(), Some(r"https://x.io/a\b"));

        // Escaped participant text links to the unescaped URL.
        let c = parse(&rewriter().rewrite(&crate::markup::escape(r"https://x.io/a\b")));
        assert_eq!(c.plain_text(), r"https://x.io/a\b");
        assert_eq!(c.span_containing("x.io").unwrap().link.as_deref(), Some(r"https://x.io/a\b"));
    }

    #[test]
    fn leaves_existing_click_tags_alone() {
        let input = "<click:open_url:'https://x.io'>site</click>";
        assert_eq!(rewriter().rewrite(input), input);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(LinkRewriter::new("("), Err(RelayError::RuleCompilationError(..))));
    }
}
