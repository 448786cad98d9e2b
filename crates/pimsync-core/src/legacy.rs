//! Legacy invoice-system output: field cleanup rules, part-number
//! formatting, and the fixed 23-column TSV contract.
//!
//! The column list, names, and content rules are the downstream importer's
//! contract. Several column names deliberately do not match the value they
//! carry (`Flag` holds the UPC, `Vendor#` holds the part prefix) — the
//! importer's field map predates this tool and must be reproduced verbatim.

use chrono::{DateTime, Utc};

use crate::pricing::{self, display_price};
use crate::product::NormalizedProduct;

/// Column headers for the legacy TSV, in emit order.
pub const LEGACY_FIELD_NAMES: [&str; 23] = [
    "Item#",
    "Description",
    "OldDescription",
    "Vendor#",
    "Flag",
    "Mfg",
    "Model",
    "MfgPart#",
    "SKU",
    "Price",
    "Retail",
    "MAP",
    "Web",
    "Dept",
    "Class",
    "Weblink",
    "Comment",
    "HasImage",
    "PimID",
    "Handle",
    "WebTitle",
    "ShortDesc",
    "Status",
];

/// Department constant required by the importer on every row.
const DEPT: &str = "COM";

/// Class constant required by the importer on every row.
const CLASS: &str = "950";

/// Maximum formatted part-number length accepted by the importer.
const PART_NUMBER_MAX: usize = 20;

/// Which legacy description column is being rendered. The old-style column
/// carries one extra substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStyle {
    New,
    Old,
}

/// Applies the importer's description cleanup to `text`.
///
/// Order matters: brand/SKU removal and the punctuation substitutions run
/// before the character strip, because the strip removes the `/` and `-`
/// context those substitutions match on. The final pass collapses
/// whitespace and consecutive case-insensitive duplicate words.
#[must_use]
pub fn clean_description(
    text: &str,
    brand_name: &str,
    sku: &str,
    style: LegacyStyle,
) -> String {
    let mut cleaned = text.to_string();

    if !brand_name.is_empty() {
        cleaned = cleaned.replace(brand_name, "");
    }
    if !sku.is_empty() {
        cleaned = cleaned.replace(sku, "");
    }

    cleaned = cleaned
        .replace(" / ", "/")
        .replace(" - ", "-")
        .replace(" with ", "/");
    if style == LegacyStyle::Old {
        cleaned = cleaned.replace(" for ", " ");
    }

    cleaned.retain(|c| c.is_ascii_alphanumeric() || c == '/' || c == '-' || c == ' ');

    collapse_duplicate_words(&cleaned)
}

/// Joins whitespace-split words with single spaces, dropping a word when it
/// equals the previous one case-insensitively.
fn collapse_duplicate_words(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if out
            .last()
            .is_some_and(|prev| prev.eq_ignore_ascii_case(word))
        {
            continue;
        }
        out.push(word);
    }
    out.join(" ")
}

/// Formats the legacy part number from a SKU.
///
/// Non-alphanumeric characters are stripped, then a hyphen is inserted after
/// the third character when more than three remain. When the hyphenated
/// result would exceed 20 characters, the number is reassembled as the first
/// four characters, the last three, then the middle truncated to the
/// remaining budget — exactly 20 characters. The reassembly order is pinned
/// by tests; see DESIGN.md before changing it.
#[must_use]
pub fn format_part_number(sku: &str) -> String {
    let cleaned: String = sku.chars().filter(char::is_ascii_alphanumeric).collect();

    if cleaned.len() <= 3 {
        return cleaned;
    }

    let hyphenated = format!("{}-{}", &cleaned[..3], &cleaned[3..]);
    if hyphenated.len() <= PART_NUMBER_MAX {
        return hyphenated;
    }

    let head = &cleaned[..4];
    let tail = &cleaned[cleaned.len() - 3..];
    let middle = &cleaned[4..cleaned.len() - 3];
    let budget = PART_NUMBER_MAX - head.len() - tail.len();
    format!("{head}{tail}{}", &middle[..budget.min(middle.len())])
}

/// Deep link into the PIM admin for the product object.
fn deep_link(product_id: &str) -> String {
    format!("https://pim.internal/admin/login/deeplink?object_{product_id}_object")
}

/// Import-audit comment embedding the stable product id.
fn import_comment(product_id: &str) -> String {
    format!("Imported from PIM object {product_id}")
}

/// Renders the 23 legacy column values for one product, in
/// [`LEGACY_FIELD_NAMES`] order.
#[must_use]
pub fn legacy_row(product: &NormalizedProduct) -> [String; 23] {
    let selected = pricing::selected_price(product).map(|(price, _)| price);
    let status = if selected.is_some() { "A" } else { "I" };

    [
        format_part_number(&product.sku),
        clean_description(
            &product.generated_title(),
            &product.brand_name,
            &product.sku,
            LegacyStyle::New,
        ),
        clean_description(
            &product.plain_text_description(),
            &product.brand_name,
            &product.sku,
            LegacyStyle::Old,
        ),
        product.part_prefix.clone(),
        product.upc.clone(),
        product.brand_name.clone(),
        product.model.clone(),
        product.vendor_part_number.clone(),
        product.sku.clone(),
        display_price(selected),
        display_price(Some(product.retail_price)),
        display_price(Some(product.map_price)),
        display_price(Some(product.effective_web_price())),
        DEPT.to_string(),
        CLASS.to_string(),
        deep_link(&product.id),
        import_comment(&product.id),
        if product.has_image() { "Y" } else { "N" }.to_string(),
        product.id.clone(),
        product.handle(),
        product.generated_title(),
        product.description_short.clone(),
        status.to_string(),
    ]
}

/// Tab-joined header line for the legacy TSV.
#[must_use]
pub fn header_line() -> String {
    LEGACY_FIELD_NAMES.join("\t")
}

/// Tab-joined value line for one product. Tabs and line breaks inside
/// values are flattened to spaces so a single row stays a single row.
#[must_use]
pub fn row_line(product: &NormalizedProduct) -> String {
    legacy_row(product)
        .iter()
        .map(|value| sanitize_cell(value))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Full TSV document: header plus one row per product, trailing newline.
#[must_use]
pub fn render_tsv(products: &[NormalizedProduct]) -> String {
    let mut out = header_line();
    out.push('\n');
    for product in products {
        out.push_str(&row_line(product));
        out.push('\n');
    }
    out
}

/// Export filename embedding the filter prefix (or `all`) and a UTC
/// timestamp.
#[must_use]
pub fn export_filename(prefix: Option<&str>, now: DateTime<Utc>) -> String {
    let prefix = match prefix {
        Some(p) if !p.is_empty() => p,
        _ => "all",
    };
    format!("{}_{}.tsv", prefix, now.format("%Y%m%d_%H%M%S"))
}

fn sanitize_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
