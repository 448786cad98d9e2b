use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{self, PriceSource};
use crate::{html, legacy, title};

/// A product record normalized from the PIM wire format, immutable once
/// constructed.
///
/// Absence conventions: text fields use the empty string, price fields use
/// zero. `image_asset_id` is the one genuinely optional field — `None` means
/// the product has no primary image, which downstream code treats differently
/// from an empty text value.
///
/// Derived values (effective price, title, sanitized descriptions, legacy
/// part number) are computed on demand from the stored fields and never
/// cached, so they cannot drift out of sync with the base record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProduct {
    /// Pimcore object id, stored as a string to avoid precision loss.
    pub id: String,
    pub sku: String,
    pub upc: String,
    pub vendor_part_number: String,
    /// Vendor classification prefix; the PIM filters on exact equality of
    /// this field.
    pub part_prefix: String,
    pub brand_name: String,
    pub model: String,
    pub web_price: Decimal,
    pub map_price: Decimal,
    pub retail_price: Decimal,
    pub description_short: String,
    /// Raw HTML from the PIM's medium description field.
    pub description_medium: String,
    /// Raw HTML from the PIM's specifications WYSIWYG field.
    pub specifications_html: String,
    /// Pimcore asset id of the primary image, when one is linked.
    pub image_asset_id: Option<String>,
}

impl NormalizedProduct {
    /// The web price when set, falling back to retail when the web price is
    /// zero.
    #[must_use]
    pub fn effective_web_price(&self) -> Decimal {
        pricing::effective_web_price(self)
    }

    /// Lowest positive price across effective-web, MAP, and retail, with the
    /// field it came from. `None` when no price is positive.
    #[must_use]
    pub fn selected_price(&self) -> Option<(Decimal, PriceSource)> {
        pricing::selected_price(self)
    }

    /// Display title assembled from brand, model (or vendor part number),
    /// and short description. At most 255 characters plus an ellipsis.
    #[must_use]
    pub fn generated_title(&self) -> String {
        title::generated_title(
            &self.brand_name,
            &self.model,
            &self.vendor_part_number,
            &self.description_short,
        )
    }

    /// Medium description and specifications combined, entity-unescaped,
    /// with `<h2>` headings demoted to `<h3>`.
    #[must_use]
    pub fn sanitized_description_html(&self) -> String {
        html::sanitize_description_html(&self.description_medium, &self.specifications_html)
    }

    /// Medium description with all markup stripped and entities unescaped.
    #[must_use]
    pub fn plain_text_description(&self) -> String {
        html::plain_text(&self.description_medium)
    }

    /// Legacy invoice-system part number derived from the SKU.
    #[must_use]
    pub fn formatted_part_number(&self) -> String {
        legacy::format_part_number(&self.sku)
    }

    /// URL-safe Shopify handle derived from the SKU.
    #[must_use]
    pub fn handle(&self) -> String {
        self.sku.to_lowercase().replace(' ', "-")
    }

    /// `true` when a primary image asset is linked in the PIM.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image_asset_id.is_some()
    }
}
