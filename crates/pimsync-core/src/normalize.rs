//! Normalization from raw PIM GraphQL nodes to [`NormalizedProduct`].
//!
//! The PIM returns heterogeneous PascalCase records with nulls and one level
//! of nested references. Every coercion happens here, driven by a static
//! alias table, so the rule engine only ever sees fully-normalized records.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::product::NormalizedProduct;

/// A raw product node exactly as the PIM GraphQL API returned it.
pub type RawRecord = serde_json::Map<String, Value>;

/// Per-record normalization failure. Records that fail are skipped by the
/// batch loop with a warning; they never abort the batch.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record is missing required field `{field}`")]
    MissingRequired { field: &'static str },

    #[error("field `{field}` cannot be coerced: {reason}")]
    Coercion { field: &'static str, reason: String },
}

/// Source-key → canonical-key alias table. PascalCase and domain-specific
/// PIM field names on the left, [`NormalizedProduct`] fields on the right.
/// Source fields absent from this table are ignored. Kept as plain data so
/// the full mapping is readable in one place.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("id", "id"),
    ("sku", "sku"),
    ("upc", "upc"),
    ("WebPrice", "web_price"),
    ("MAP", "map_price"),
    ("Retail", "retail_price"),
    ("BrandName", "brand_name"),
    ("Model", "model"),
    ("VendorPartNumber", "vendor_part_number"),
    ("PartPrefix", "part_prefix"),
    ("Description_Short", "description_short"),
    ("Description_Medium", "description_medium"),
    ("Specifications_WYSIWYG", "specifications_html"),
    ("ImagePrimary", "image_asset_id"),
];

/// Source key for the nested primary-image reference.
const IMAGE_PRIMARY_KEY: &str = "ImagePrimary";

/// Normalizes one raw PIM node into a [`NormalizedProduct`].
///
/// Coercions:
/// - text fields: `null`/absent → `""`; numbers pass through as their
///   string form.
/// - price fields: `null`/absent → zero; negative values are clamped to
///   zero with a warning (the legacy feed treats zero as "unset").
/// - `ImagePrimary` is flattened one level to its `id`; an absent or null
///   reference yields `None`, a distinct "no image" state.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingRequired`] when `id` or `sku` is absent,
/// null, or empty, and [`NormalizeError::Coercion`] when a value has a type
/// that cannot be interpreted for its field.
pub fn normalize_record(raw: &RawRecord) -> Result<NormalizedProduct, NormalizeError> {
    let id = required_text(raw, source_key("id"))?;
    let sku = required_text(raw, source_key("sku"))?;

    Ok(NormalizedProduct {
        id,
        sku,
        upc: text_field(raw, source_key("upc"))?,
        vendor_part_number: text_field(raw, source_key("vendor_part_number"))?,
        part_prefix: text_field(raw, source_key("part_prefix"))?,
        brand_name: text_field(raw, source_key("brand_name"))?,
        model: text_field(raw, source_key("model"))?,
        web_price: price_field(raw, source_key("web_price"))?,
        map_price: price_field(raw, source_key("map_price"))?,
        retail_price: price_field(raw, source_key("retail_price"))?,
        description_short: text_field(raw, source_key("description_short"))?,
        description_medium: text_field(raw, source_key("description_medium"))?,
        specifications_html: text_field(raw, source_key("specifications_html"))?,
        image_asset_id: image_asset_id(raw)?,
    })
}

/// Looks up the source key for a canonical field in [`FIELD_ALIASES`].
///
/// Panicking here is correct: a miss is a programming error in the static
/// table, not a data error, and every entry is exercised by tests.
fn source_key(canonical: &'static str) -> &'static str {
    FIELD_ALIASES
        .iter()
        .find(|(_, c)| *c == canonical)
        .map(|(s, _)| *s)
        .unwrap_or_else(|| unreachable!("canonical field `{canonical}` missing from FIELD_ALIASES"))
}

fn required_text(raw: &RawRecord, field: &'static str) -> Result<String, NormalizeError> {
    let value = text_field(raw, field)?;
    if value.is_empty() {
        return Err(NormalizeError::MissingRequired { field });
    }
    Ok(value)
}

fn text_field(raw: &RawRecord, field: &'static str) -> Result<String, NormalizeError> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(NormalizeError::Coercion {
            field,
            reason: format!("expected text, got {other}"),
        }),
    }
}

fn price_field(raw: &RawRecord, field: &'static str) -> Result<Decimal, NormalizeError> {
    let value = match raw.get(field) {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(Value::Number(n)) => {
            Decimal::from_str(&n.to_string()).map_err(|e| NormalizeError::Coercion {
                field,
                reason: e.to_string(),
            })?
        }
        Some(Value::String(s)) => {
            Decimal::from_str(s).map_err(|e| NormalizeError::Coercion {
                field,
                reason: e.to_string(),
            })?
        }
        Some(other) => {
            return Err(NormalizeError::Coercion {
                field,
                reason: format!("expected number, got {other}"),
            })
        }
    };

    if value < Decimal::ZERO {
        tracing::warn!(field, %value, "negative price clamped to zero");
        return Ok(Decimal::ZERO);
    }
    Ok(value)
}

/// Flattens the one-level `ImagePrimary { id }` reference to a scalar asset
/// id. Absent and null both mean "no image".
fn image_asset_id(raw: &RawRecord) -> Result<Option<String>, NormalizeError> {
    match raw.get(IMAGE_PRIMARY_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(nested)) => match nested.get("id") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(NormalizeError::Coercion {
                field: IMAGE_PRIMARY_KEY,
                reason: format!("expected scalar id, got {other}"),
            }),
        },
        Some(other) => Err(NormalizeError::Coercion {
            field: IMAGE_PRIMARY_KEY,
            reason: format!("expected object, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("test fixture must be an object, got {other}"),
        }
    }

    fn full_record() -> RawRecord {
        raw(json!({
            "id": "4711",
            "sku": "VZ-100",
            "upc": "012345678905",
            "WebPrice": 199.0,
            "MAP": 249.0,
            "Retail": 299.0,
            "BrandName": "Vizrt",
            "Model": "Viz Engine",
            "VendorPartNumber": "VP-100",
            "PartPrefix": "VIZ",
            "Description_Short": "Realtime renderer",
            "Description_Medium": "<p>Broadcast graphics.</p>",
            "Specifications_WYSIWYG": "<h2>Specs</h2>",
            "ImagePrimary": { "id": 88 }
        }))
    }

    #[test]
    fn normalizes_a_complete_record() {
        let product = normalize_record(&full_record()).unwrap();
        assert_eq!(product.id, "4711");
        assert_eq!(product.sku, "VZ-100");
        assert_eq!(product.brand_name, "Vizrt");
        assert_eq!(product.web_price, Decimal::from_str("199").unwrap());
        assert_eq!(product.image_asset_id.as_deref(), Some("88"));
    }

    #[test]
    fn numeric_id_is_accepted_as_text() {
        let mut record = full_record();
        record.insert("id".to_string(), json!(4711));
        let product = normalize_record(&record).unwrap();
        assert_eq!(product.id, "4711");
    }

    #[test]
    fn null_text_becomes_empty_string() {
        let mut record = full_record();
        record.insert("Model".to_string(), Value::Null);
        record.insert("Description_Medium".to_string(), Value::Null);
        let product = normalize_record(&record).unwrap();
        assert_eq!(product.model, "");
        assert_eq!(product.description_medium, "");
    }

    #[test]
    fn absent_text_becomes_empty_string() {
        let mut record = full_record();
        record.remove("Description_Short");
        let product = normalize_record(&record).unwrap();
        assert_eq!(product.description_short, "");
    }

    #[test]
    fn null_price_becomes_zero() {
        let mut record = full_record();
        record.insert("MAP".to_string(), Value::Null);
        let product = normalize_record(&record).unwrap();
        assert_eq!(product.map_price, Decimal::ZERO);
    }

    #[test]
    fn negative_price_clamps_to_zero() {
        let mut record = full_record();
        record.insert("WebPrice".to_string(), json!(-10.0));
        let product = normalize_record(&record).unwrap();
        assert_eq!(product.web_price, Decimal::ZERO);
    }

    #[test]
    fn null_image_reference_is_none_not_empty() {
        let mut record = full_record();
        record.insert("ImagePrimary".to_string(), Value::Null);
        let product = normalize_record(&record).unwrap();
        assert!(product.image_asset_id.is_none());
    }

    #[test]
    fn nested_image_id_is_flattened() {
        let mut record = full_record();
        record.insert("ImagePrimary".to_string(), json!({ "id": "asset-9" }));
        let product = normalize_record(&record).unwrap();
        assert_eq!(product.image_asset_id.as_deref(), Some("asset-9"));
    }

    #[test]
    fn missing_id_rejects_the_record() {
        let mut record = full_record();
        record.remove("id");
        let err = normalize_record(&record).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MissingRequired { field: "id" }
        ));
    }

    #[test]
    fn null_sku_rejects_the_record() {
        let mut record = full_record();
        record.insert("sku".to_string(), Value::Null);
        let err = normalize_record(&record).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MissingRequired { field: "sku" }
        ));
    }

    #[test]
    fn uncoercible_price_rejects_the_record() {
        let mut record = full_record();
        record.insert("Retail".to_string(), json!({ "amount": 1 }));
        let err = normalize_record(&record).unwrap_err();
        assert!(matches!(err, NormalizeError::Coercion { field: "Retail", .. }));
    }

    #[test]
    fn unmapped_source_fields_are_ignored() {
        let mut record = full_record();
        record.insert("WhatsInBox".to_string(), json!("cables"));
        record.insert("ProductType".to_string(), json!("hardware"));
        assert!(normalize_record(&record).is_ok());
    }

    #[test]
    fn every_alias_maps_to_a_distinct_canonical_field() {
        let mut canonicals: Vec<&str> = FIELD_ALIASES.iter().map(|(_, c)| *c).collect();
        canonicals.sort_unstable();
        canonicals.dedup();
        assert_eq!(canonicals.len(), FIELD_ALIASES.len());
    }
}
