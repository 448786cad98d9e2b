//! Price selection rules.
//!
//! Two stages: the web price falls back to retail when unset, then the
//! lowest positive candidate across effective-web, MAP, and retail wins.
//! Zero and negative values are never candidates — zero is the canonical
//! "unset" value and the floor keeps a missing price from underselling the
//! whole catalog entry.

use rust_decimal::Decimal;

use crate::product::NormalizedProduct;

/// Which price field won selection, for per-product decision logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// The effective web price (web price, or retail when web is unset).
    EffectiveWeb,
    Map,
    Retail,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::EffectiveWeb => write!(f, "web"),
            PriceSource::Map => write!(f, "map"),
            PriceSource::Retail => write!(f, "retail"),
        }
    }
}

/// The web price when positive, otherwise the retail price.
#[must_use]
pub fn effective_web_price(product: &NormalizedProduct) -> Decimal {
    if product.web_price > Decimal::ZERO {
        product.web_price
    } else {
        product.retail_price
    }
}

/// Lowest positive price among effective-web, MAP, and retail.
///
/// Returns `None` when no candidate is positive; callers render that as the
/// `"0.00"` sentinel in the legacy channel and omit the price entirely in
/// the Shopify channel. Ties go to the earlier candidate in the order
/// effective-web, MAP, retail.
#[must_use]
pub fn selected_price(product: &NormalizedProduct) -> Option<(Decimal, PriceSource)> {
    let candidates = [
        (effective_web_price(product), PriceSource::EffectiveWeb),
        (product.map_price, PriceSource::Map),
        (product.retail_price, PriceSource::Retail),
    ];

    let mut best: Option<(Decimal, PriceSource)> = None;
    for (price, source) in candidates {
        if price <= Decimal::ZERO {
            continue;
        }
        match best {
            Some((current, _)) if current <= price => {}
            _ => best = Some((price, source)),
        }
    }
    best
}

/// Renders a price for the legacy TSV channel: two decimal places, with
/// `"0.00"` standing in for "no price".
#[must_use]
pub fn display_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) => format!("{p:.2}"),
        None => "0.00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_prices(web: i64, map: i64, retail: i64) -> NormalizedProduct {
        NormalizedProduct {
            id: "1".to_string(),
            sku: "SKU-1".to_string(),
            upc: String::new(),
            vendor_part_number: String::new(),
            part_prefix: String::new(),
            brand_name: String::new(),
            model: String::new(),
            web_price: Decimal::new(web, 2),
            map_price: Decimal::new(map, 2),
            retail_price: Decimal::new(retail, 2),
            description_short: String::new(),
            description_medium: String::new(),
            specifications_html: String::new(),
            image_asset_id: None,
        }
    }

    #[test]
    fn effective_web_price_uses_web_when_positive() {
        let product = product_with_prices(10_00, 0, 20_00);
        assert_eq!(effective_web_price(&product), Decimal::new(10_00, 2));
    }

    #[test]
    fn effective_web_price_falls_back_to_retail() {
        let product = product_with_prices(0, 0, 20_00);
        assert_eq!(effective_web_price(&product), Decimal::new(20_00, 2));
    }

    #[test]
    fn selected_price_is_minimum_positive() {
        let product = product_with_prices(30_00, 25_00, 40_00);
        let (price, source) = selected_price(&product).unwrap();
        assert_eq!(price, Decimal::new(25_00, 2));
        assert_eq!(source, PriceSource::Map);
    }

    #[test]
    fn selected_price_skips_zero_candidates() {
        let product = product_with_prices(0, 0, 15_00);
        let (price, source) = selected_price(&product).unwrap();
        assert_eq!(price, Decimal::new(15_00, 2));
        // Web fell back to retail, so the effective-web candidate wins the tie.
        assert_eq!(source, PriceSource::EffectiveWeb);
    }

    #[test]
    fn selected_price_none_when_all_unset() {
        let product = product_with_prices(0, 0, 0);
        assert!(selected_price(&product).is_none());
    }

    #[test]
    fn selected_price_ignores_negative_map() {
        let mut product = product_with_prices(12_00, 0, 18_00);
        product.map_price = Decimal::new(-5_00, 2);
        let (price, _) = selected_price(&product).unwrap();
        assert_eq!(price, Decimal::new(12_00, 2));
    }

    #[test]
    fn display_price_two_decimal_places() {
        assert_eq!(display_price(Some(Decimal::new(12_5, 1))), "12.50");
        assert_eq!(display_price(Some(Decimal::new(199, 0))), "199.00");
    }

    #[test]
    fn display_price_sentinel_when_none() {
        assert_eq!(display_price(None), "0.00");
    }
}
