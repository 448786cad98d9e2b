//! Shopify-bound field assignments.
//!
//! Pure mapping from a [`NormalizedProduct`] to the three assignment groups
//! the upsert needs: product, variant, and metafields. The client crate
//! transports these without interpreting them, so every mapping rule stays
//! testable without a network.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing;
use crate::product::NormalizedProduct;

/// Metafield namespace for buyer-facing specification data.
pub const METAFIELD_NAMESPACE_SPECS: &str = "specs";

/// Metafield namespace mirrored into the legacy integration.
pub const METAFIELD_NAMESPACE_LEGACY: &str = "legacy";

/// Key under which the vendor part number is written in both namespaces.
pub const METAFIELD_KEY_VENDOR_PART: &str = "vendor_part_number";

/// Product-level assignments for `productCreate` / `productUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductFields {
    pub title: String,
    #[serde(rename = "descriptionHtml")]
    pub description_html: String,
    pub vendor: String,
    pub handle: String,
    pub status: String,
}

/// Variant-level assignments for the default variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantFields {
    pub sku: String,
    /// Selected price; `None` means no positive price exists and the price
    /// assignment is omitted from the update.
    pub price: Option<Decimal>,
    /// UPC, when the product has one.
    pub barcode: Option<String>,
    /// Inventory tracking is disabled for synced products — stock lives in
    /// the legacy system.
    pub tracked: bool,
    /// Continue selling when out of stock.
    pub sell_when_out_of_stock: bool,
}

/// One namespaced metafield assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetafieldAssignment {
    pub namespace: &'static str,
    pub key: &'static str,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: &'static str,
}

/// Complete set of assignments for one product upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPush {
    pub product: ProductFields,
    pub variant: VariantFields,
    pub metafields: Vec<MetafieldAssignment>,
}

/// Maps a normalized product to its Shopify assignments.
///
/// The vendor part number is written to both the `specs` and `legacy`
/// metafield namespaces; the two consumers evolve independently and each
/// owns its namespace.
#[must_use]
pub fn build_product_push(product: &NormalizedProduct) -> ProductPush {
    let price = pricing::selected_price(product).map(|(p, _)| p);
    let barcode = if product.upc.is_empty() {
        None
    } else {
        Some(product.upc.clone())
    };

    let metafields = if product.vendor_part_number.is_empty() {
        Vec::new()
    } else {
        vec![
            MetafieldAssignment {
                namespace: METAFIELD_NAMESPACE_SPECS,
                key: METAFIELD_KEY_VENDOR_PART,
                value: product.vendor_part_number.clone(),
                value_type: "single_line_text_field",
            },
            MetafieldAssignment {
                namespace: METAFIELD_NAMESPACE_LEGACY,
                key: METAFIELD_KEY_VENDOR_PART,
                value: product.vendor_part_number.clone(),
                value_type: "single_line_text_field",
            },
        ]
    };

    ProductPush {
        product: ProductFields {
            title: product.generated_title(),
            description_html: product.sanitized_description_html(),
            vendor: product.brand_name.clone(),
            handle: product.handle(),
            status: "ACTIVE".to_string(),
        },
        variant: VariantFields {
            sku: product.sku.clone(),
            price,
            barcode,
            tracked: false,
            sell_when_out_of_stock: true,
        },
        metafields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product() -> NormalizedProduct {
        NormalizedProduct {
            id: "4711".to_string(),
            sku: "VZ 100-B".to_string(),
            upc: "012345678905".to_string(),
            vendor_part_number: "VP-100".to_string(),
            part_prefix: "VIZ".to_string(),
            brand_name: "Vizrt".to_string(),
            model: "Viz Engine".to_string(),
            web_price: Decimal::new(199_00, 2),
            map_price: Decimal::ZERO,
            retail_price: Decimal::new(299_00, 2),
            description_short: "Realtime renderer".to_string(),
            description_medium: "<p>Broadcast graphics.</p>".to_string(),
            specifications_html: String::new(),
            image_asset_id: None,
        }
    }

    #[test]
    fn product_fields_use_generated_title_and_handle() {
        let push = build_product_push(&make_product());
        assert_eq!(push.product.title, "Vizrt Viz Engine Realtime renderer");
        assert_eq!(push.product.handle, "vz-100-b");
        assert_eq!(push.product.vendor, "Vizrt");
        assert_eq!(push.product.status, "ACTIVE");
    }

    #[test]
    fn variant_carries_selected_price_as_decimal() {
        let push = build_product_push(&make_product());
        assert_eq!(push.variant.price, Some(Decimal::new(199_00, 2)));
        assert_eq!(push.variant.barcode.as_deref(), Some("012345678905"));
        assert!(!push.variant.tracked);
        assert!(push.variant.sell_when_out_of_stock);
    }

    #[test]
    fn variant_price_omitted_when_no_positive_price() {
        let mut product = make_product();
        product.web_price = Decimal::ZERO;
        product.retail_price = Decimal::ZERO;
        let push = build_product_push(&product);
        assert!(push.variant.price.is_none());
    }

    #[test]
    fn empty_upc_omits_barcode() {
        let mut product = make_product();
        product.upc = String::new();
        let push = build_product_push(&product);
        assert!(push.variant.barcode.is_none());
    }

    #[test]
    fn vendor_part_number_written_to_two_namespaces() {
        let push = build_product_push(&make_product());
        assert_eq!(push.metafields.len(), 2);
        let namespaces: Vec<_> = push.metafields.iter().map(|m| m.namespace).collect();
        assert_eq!(
            namespaces,
            vec![METAFIELD_NAMESPACE_SPECS, METAFIELD_NAMESPACE_LEGACY]
        );
        for metafield in &push.metafields {
            assert_eq!(metafield.key, METAFIELD_KEY_VENDOR_PART);
            assert_eq!(metafield.value, "VP-100");
        }
    }

    #[test]
    fn empty_vendor_part_number_writes_no_metafields() {
        let mut product = make_product();
        product.vendor_part_number = String::new();
        let push = build_product_push(&product);
        assert!(push.metafields.is_empty());
    }
}
