//! Regex-based extraction helpers for the catalog's MediaWiki markup.
//!
//! The catalog pages are loosely structured HTML; these helpers only look at
//! the handful of shapes the transforms need (table rows, cells, anchors and
//! marker `div`s) and never fail, returning `None`/empty on anything unexpected.

use std::sync::OnceLock;

use regex::{Captures, Regex};

static TR_RE: OnceLock<Regex> = OnceLock::new();
static TD_RE: OnceLock<Regex> = OnceLock::new();
static ANCHOR_RE: OnceLock<Regex> = OnceLock::new();
static DIV_RE: OnceLock<Regex> = OnceLock::new();
static CLASS_ATTR_RE: OnceLock<Regex> = OnceLock::new();
static TITLE_ATTR_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn tr_re() -> &'static Regex {
    TR_RE.get_or_init(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr>").expect("valid tr regex"))
}

fn td_re() -> &'static Regex {
    TD_RE.get_or_init(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("valid td regex"))
}

fn anchor_re() -> &'static Regex {
    ANCHOR_RE.get_or_init(|| Regex::new(r"(?is)<a\b([^>]*)>").expect("valid anchor regex"))
}

fn div_re() -> &'static Regex {
    DIV_RE.get_or_init(|| Regex::new(r"(?is)<div\b([^>]*)>").expect("valid div regex"))
}

fn attr_value<'a>(re: &OnceLock<Regex>, name: &str, attrs: &'a str) -> Option<&'a str> {
    let re = re.get_or_init(|| {
        Regex::new(&format!(
            r#"(?is)\b{name}\s*=\s*(?:"([^"]*)"|'([^']*)')"#
        ))
        .expect("valid attribute regex")
    });
    let caps = re.captures(attrs)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

fn class_attr(attrs: &str) -> Option<&str> {
    attr_value(&CLASS_ATTR_RE, "class", attrs)
}

fn title_attr(attrs: &str) -> Option<&str> {
    attr_value(&TITLE_ATTR_RE, "title", attrs)
}

/// Inner markup of every `<tr>` whose `class` attribute starts with `prefix`
/// (CSS `tr[class^=prefix]`), in document order.
pub(crate) fn rows_with_class_prefix<'a>(html: &'a str, prefix: &str) -> Vec<&'a str> {
    tr_re()
        .captures_iter(html)
        .filter(|caps| {
            caps.get(1)
                .and_then(|attrs| class_attr(attrs.as_str()))
                .is_some_and(|class| class.starts_with(prefix))
        })
        .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
        .collect()
}

/// Inner markup of each `<td>` cell in a row fragment.
pub(crate) fn cells(row: &str) -> Vec<&str> {
    td_re()
        .captures_iter(row)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Decoded `title` attribute of the first anchor in `fragment` that carries one.
pub(crate) fn first_anchor_title(fragment: &str) -> Option<String> {
    anchor_re()
        .captures_iter(fragment)
        .find_map(|caps| caps.get(1).and_then(|attrs| title_attr(attrs.as_str())))
        .map(decode_entities)
}

/// Text of the first `<td>` that follows the anchor titled `title`.
pub(crate) fn cell_after_anchor_titled(html: &str, title: &str) -> Option<String> {
    let anchor_end = anchor_re().captures_iter(html).find_map(|caps| {
        let attrs = caps.get(1)?;
        let value = title_attr(attrs.as_str())?;
        if decode_entities(value) != title {
            return None;
        }
        caps.get(0).map(|m| m.end())
    })?;

    td_re()
        .captures(&html[anchor_end..])
        .and_then(|caps| caps.get(1))
        .map(|m| text(m.as_str()))
}

/// Whether any `<div>` carries `class` among its whitespace-separated classes.
pub(crate) fn has_div_with_class(html: &str, class: &str) -> bool {
    div_re().captures_iter(html).any(|caps| {
        caps.get(1)
            .and_then(|attrs| class_attr(attrs.as_str()))
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    })
}

/// Visible text of a markup fragment: tags removed, entities decoded, trimmed.
pub(crate) fn text(fragment: &str) -> String {
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
    let stripped = tag_re.replace_all(fragment, "");
    decode_entities(&stripped).trim().to_string()
}

pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let re = ENTITY_RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
            .expect("valid entity regex")
    });

    re.replace_all(s, |caps: &Captures<'_>| {
        let entity = &caps[1];
        let decoded = if let Some(hex) = entity
            .strip_prefix("#x")
            .or_else(|| entity.strip_prefix("#X"))
        {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = entity.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => None,
            }
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}
