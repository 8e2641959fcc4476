//! Input sanitization for user-supplied strings that end up in HTML contexts.

/// Escape characters with special meaning in HTML.
///
/// Tag names are rendered verbatim in the gallery views, so anything a
/// browser could interpret as markup is replaced with its entity form.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Normalize a tag for storage: HTML-escaped and case-folded to lowercase.
pub fn normalize_tag(tag: &str) -> String {
    escape_html(tag.trim()).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escape_html("sunset at kebab"), "sunset at kebab");
    }

    #[test]
    fn tags_are_lowercased() {
        assert_eq!(normalize_tag("Sunset"), "sunset");
        assert_eq!(normalize_tag("  Göteborg "), "göteborg");
    }
}
