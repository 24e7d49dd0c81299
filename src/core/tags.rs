//! Conversion between the comma-separated tag field users type and the tag
//! lists the API speaks.

use super::folder::Tag;

/// Split a tag field on commas. Elements are trimmed, empty elements are
/// dropped and repeats keep their first occurrence.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let tag = raw.trim();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

/// Render tags back into the editable field form.
pub fn format_tags(tags: &[Tag]) -> String {
    format_tag_names(tags.iter().map(|t| t.name.as_str()))
}

pub fn format_tag_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}
