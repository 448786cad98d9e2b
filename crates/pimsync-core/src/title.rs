//! Display title assembly.

/// Maximum title length before truncation, excluding the ellipsis marker.
pub const MAX_TITLE_CHARS: usize = 255;

/// Appended when a title is truncated. Sits outside the 255-character budget.
pub const ELLIPSIS: &str = "...";

/// Builds the display title: brand, then model (or the vendor part number
/// when no model is set), then the short description, single-space joined
/// with empty components skipped.
///
/// Titles longer than [`MAX_TITLE_CHARS`] characters are cut at the last
/// whitespace boundary at or before the limit and suffixed with
/// [`ELLIPSIS`] — a word is never split.
#[must_use]
pub fn generated_title(
    brand_name: &str,
    model: &str,
    vendor_part_number: &str,
    description_short: &str,
) -> String {
    let model_or_part = if model.is_empty() {
        vendor_part_number
    } else {
        model
    };

    let title = [brand_name, model_or_part, description_short]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    truncate_at_word_boundary(&title, MAX_TITLE_CHARS)
}

/// Truncates `text` to at most `max_chars` characters at a whitespace
/// boundary and appends [`ELLIPSIS`]. Text within the limit is returned
/// unchanged. Lengths are measured in characters, not bytes.
fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    // Last whitespace at or before the limit; position max_chars itself is a
    // valid boundary since everything before it fits.
    let cut = chars[..=max_chars]
        .iter()
        .rposition(|c| c.is_whitespace())
        .unwrap_or(max_chars);

    let truncated: String = chars[..cut].iter().collect();
    format!("{}{}", truncated.trim_end(), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_brand_model_and_short_description() {
        let title = generated_title("Vizrt", "Viz Engine", "VP-100", "Realtime renderer");
        assert_eq!(title, "Vizrt Viz Engine Realtime renderer");
    }

    #[test]
    fn vendor_part_number_substitutes_for_missing_model() {
        let title = generated_title("Acme", "", "Widget9000", "A gadget");
        assert_eq!(title, "Acme Widget9000 A gadget");
    }

    #[test]
    fn empty_components_do_not_double_spaces() {
        let title = generated_title("Acme", "", "", "A gadget");
        assert_eq!(title, "Acme A gadget");
        assert!(!title.contains("  "));
    }

    #[test]
    fn all_empty_yields_empty_title() {
        assert_eq!(generated_title("", "", "", ""), "");
    }

    #[test]
    fn long_title_truncates_at_word_boundary_with_ellipsis() {
        let long_desc = "A ".repeat(260).trim_end().to_string();
        let title = generated_title("Acme", "", "Widget9000", &long_desc);

        assert!(title.starts_with("Acme Widget9000 A"));
        assert!(title.ends_with(ELLIPSIS));
        let body = title.trim_end_matches(ELLIPSIS);
        assert!(body.chars().count() <= MAX_TITLE_CHARS);
        assert!(!body.ends_with(' '));
    }

    #[test]
    fn truncation_never_splits_a_word() {
        // Construct a title where position 255 lands mid-word.
        let word = "abcdefghij";
        let desc = std::iter::repeat(word)
            .take(40)
            .collect::<Vec<_>>()
            .join(" ");
        let title = generated_title("Brand", "Model", "", &desc);

        let body = title.trim_end_matches(ELLIPSIS);
        // Every word in the output must be intact.
        for w in body.split_whitespace().skip(2) {
            assert_eq!(w, word, "truncation split a word: {body:?}");
        }
    }

    #[test]
    fn title_within_limit_is_untouched() {
        let title = generated_title("Brand", "Model", "", "short");
        assert_eq!(title, "Brand Model short");
        assert!(!title.contains(ELLIPSIS));
    }
}
