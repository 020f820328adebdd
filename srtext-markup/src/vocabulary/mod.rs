// srtext-markup/src/vocabulary/mod.rs
//! Markup recognisers shared by every normalizer variant.
//!
//! Each pattern is compiled once on first use and is read-only afterwards,
//! so all variants can be called concurrently.

use once_cell::sync::Lazy;
use regex::Regex;

/// Element names replaced (never removed) by the normalizers.
///
/// `.DOCTYPE` is a pattern fragment: the dot accepts the `!` of `<!DOCTYPE>`.
pub const TAG_VOCABULARY: &[&str] = &[
    ".DOCTYPE", "a", "abbr", "acronym", "address", "applet", "area", "article", "aside",
    "audio", "b", "base", "basefont", "bdi", "bdo", "big", "blockquote", "body", "br",
    "button", "canvas", "caption", "center", "cite", "code", "col", "colgroup", "data",
    "datalist", "dd", "del", "details", "dfn", "dialog", "dir", "div", "dl", "dt", "em",
    "embed", "fieldset", "figcaption", "figure", "font", "footer", "form", "frame",
    "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "i",
    "iframe", "img", "input", "ins", "kbd", "label", "legend", "li", "link", "main", "map",
    "mark", "meta", "meter", "nav", "noframes", "noscript", "object", "ol", "optgroup",
    "option", "output", "p", "param", "picture", "pre", "progress", "q", "rp", "rt", "ruby",
    "s", "samp", "script", "section", "select", "small", "source", "span", "strike",
    "strong", "style", "sub", "summary", "sup", "svg", "table", "tbody", "td", "template",
    "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track", "tt", "u", "ul",
    "var", "video", "wbr",
];

/// The multi-character entity that is widened to an equal run of spaces.
pub const NBSP_ENTITY: &str = "&nbsp;";

pub(crate) static SELF_CLOSING_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<script[^>]*/>").expect("self-closing script pattern"));

pub(crate) static SELF_CLOSING_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<style[^>]*/>").expect("self-closing style pattern"));

// An unterminated block runs to the end of the input.
pub(crate) static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>(?:.*?</script[^>]*>|.*)").expect("script block pattern")
});

pub(crate) static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style[^>]*>(?:.*?</style[^>]*>|.*)").expect("style block pattern")
});

pub(crate) static VOCABULARY_TAG: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)</?(?:{})(?: [^<>]*)?>", TAG_VOCABULARY.join("|"));
    Regex::new(&pattern).expect("vocabulary tag pattern")
});

pub(crate) static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:br|/p|/div|/li|/tr)(?: [^<>]*)?/?>").expect("line break pattern"));

/// Returns true when `text` contains anything a normalizer would rewrite.
pub fn contains_markup(text: &str) -> bool {
    text.contains(NBSP_ENTITY)
        || SELF_CLOSING_SCRIPT.is_match(text)
        || SELF_CLOSING_STYLE.is_match(text)
        || SCRIPT_BLOCK.is_match(text)
        || STYLE_BLOCK.is_match(text)
        || VOCABULARY_TAG.is_match(text)
}
