//! Element categories: void elements and raw-text elements

/// Elements that never have content or an end tag
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "menuitem",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is rendered verbatim
pub const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Case-insensitive void element check
pub fn is_void_tag(name: &str) -> bool {
    VOID_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_tag(name: &str) -> bool {
    RAW_TEXT_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}
