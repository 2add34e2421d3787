//! Language-prefixed catalog links.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything but RFC 3986 unreserved characters is escaped inside a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

#[must_use]
pub fn trainings(lang: &str) -> String {
    format!("/{}/training/", segment(lang))
}

#[must_use]
pub fn all(lang: &str) -> String {
    format!("{}all/", trainings(lang))
}

#[must_use]
pub fn date(lang: &str, date: &str) -> String {
    format!("{}all/{}", trainings(lang), segment(date))
}

#[must_use]
pub fn key(lang: &str, key: &str) -> String {
    format!("{}key/{}", trainings(lang), segment(key))
}

#[must_use]
pub fn search(lang: &str) -> String {
    format!("{}search/", trainings(lang))
}

#[must_use]
pub fn training(lang: &str, slug: &str) -> String {
    format!("{}{}", trainings(lang), segment(slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_escaped() {
        assert_eq!(key("en", "big data"), "/en/training/key/big%20data");
        assert_eq!(training("es", "rust/async"), "/es/training/rust%2Fasync");
        assert_eq!(date("en", "2024-05-01"), "/en/training/all/2024-05-01");
    }

    #[test]
    fn section_links_end_with_a_slash() {
        assert_eq!(trainings("ca"), "/ca/training/");
        assert_eq!(all("ca"), "/ca/training/all/");
        assert_eq!(search("ca"), "/ca/training/search/");
    }
}
