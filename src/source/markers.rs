//! Status page marker extraction
//!
//! Icecast-style status pages render each stream statistic as an element
//! carrying a fixed CSS class (`streamstats` by default). When the stream
//! is down, no such elements are emitted at all.

use regex::Regex;
use std::sync::LazyLock;

/// Opening tag carrying a class attribute
static CLASSED_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*?\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))[^>]*>"#,
    )
    .expect("marker pattern is valid")
});

/// Any opening or closing tag
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b[^>]*>").expect("tag pattern is valid")
});

/// Text of every element whose class list contains `class`, in document order
///
/// Nested markup inside a marker is dropped and whitespace collapsed, so
/// `<td class="streamstats"><b>37</b></td>` reads as `37`.
pub fn extract_markers(document: &str, class: &str) -> Vec<String> {
    CLASSED_ELEMENT
        .captures_iter(document)
        .filter(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .is_some_and(|m| m.as_str().split_whitespace().any(|c| c == class))
        })
        .filter_map(|caps| {
            let open = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let body = element_body(&document[open.end()..], name);
            Some(text_of(body))
        })
        .collect()
}

/// Content up to the tag that closes `name`
///
/// Without a matching close tag the content ends at the next tag.
fn element_body<'a>(rest: &'a str, name: &str) -> &'a str {
    let mut depth = 1usize;
    for caps in TAG.captures_iter(rest) {
        let (Some(tag), Some(tag_name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if !tag_name.as_str().eq_ignore_ascii_case(name) {
            continue;
        }
        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return &rest[..tag.start()];
            }
        } else if !tag.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    rest.find('<').map_or(rest, |end| &rest[..end])
}

fn text_of(body: &str) -> String {
    TAG.replace_all(body, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
