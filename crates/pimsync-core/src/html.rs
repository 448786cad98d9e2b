//! HTML cleanup for the rich and plain description channels.
//!
//! The PIM stores WYSIWYG HTML with double-escaped entities and `<h2>`
//! section headings. The rich channel unescapes entities and demotes `<h2>`
//! to `<h3>` so product pages don't compete with the storefront's own
//! heading hierarchy; nothing else is rewritten. The plain channel strips
//! all markup.

use std::sync::LazyLock;

use regex::Regex;

/// Matches an opening or closing `<h2>` tag, case-insensitive, capturing the
/// optional `/` and any attributes. `<h20>` and friends do not match.
static H2_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)h2(\s[^>]*|/)?>").expect("static regex must compile"));

/// Matches any markup tag for the plain-text channel.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex must compile"));

/// Matches decimal and hexadecimal numeric character references.
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]{1,6}|[0-9]{1,7});").expect("static regex must compile"));

/// Decodes the HTML entities observed in PIM WYSIWYG content: the common
/// named entities plus numeric character references. `&amp;` is decoded
/// last so a double-escaped sequence like `&amp;lt;` unescapes exactly one
/// level.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let decoded = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ");

    let decoded = NUMERIC_ENTITY_RE.replace_all(&decoded, |caps: &regex::Captures<'_>| {
        let body = &caps[1];
        let code = if let Some(hex) = body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
            u32::from_str_radix(hex, 16)
        } else {
            body.parse::<u32>()
        };
        code.ok()
            .and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });

    decoded.replace("&amp;", "&")
}

/// Rewrites every `<h2>`/`</h2>` tag to `<h3>`/`</h3>`, preserving
/// attributes. Tag-name matching is case-insensitive.
#[must_use]
pub fn demote_h2_headings(html: &str) -> String {
    H2_TAG_RE
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let slash = &caps[1];
            let rest = caps.get(2).map_or("", |m| m.as_str());
            format!("<{slash}h3{rest}>")
        })
        .into_owned()
}

/// The rich-description channel: medium description and specifications HTML
/// joined with a single space, entity-unescaped, with `<h2>` headings
/// demoted to `<h3>`.
#[must_use]
pub fn sanitize_description_html(description_medium: &str, specifications_html: &str) -> String {
    let combined = match (description_medium.is_empty(), specifications_html.is_empty()) {
        (false, false) => format!("{description_medium} {specifications_html}"),
        (false, true) => description_medium.to_string(),
        (true, _) => specifications_html.to_string(),
    };
    demote_h2_headings(&decode_entities(&combined))
}

/// The plain-text channel: all markup removed, then entities unescaped.
/// Operates on the medium description only — specifications never feed the
/// plain channel.
#[must_use]
pub fn plain_text(description_medium: &str) -> String {
    decode_entities(&TAG_RE.replace_all(description_medium, ""))
}
