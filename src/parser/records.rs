//! Vendor product records as they appear on the wire

use serde::{Deserialize, Serialize};

/// Haravan product object (IPM option-selector script and Kim Dong `.js` endpoint).
///
/// Prices are in minor units (x100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaravanProduct {
    pub handle: String,
    pub available: bool,
    #[serde(default)]
    pub variants: Vec<HaravanVariant>,
}

/// One purchasable option of a Haravan product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaravanVariant {
    #[serde(default)]
    pub title: String,
    pub available: bool,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

/// Analytics meta blob (`{"page":...,"product":...}`) present on every Haravan product page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaravanMeta {
    #[serde(default)]
    pub page: Option<serde_json::Value>,
    pub product: HaravanMetaProduct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaravanMetaProduct {
    pub title: String,
    pub available: bool,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub handle: Option<String>,
}

/// Tiki product API record. Price is already in VND.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikiProduct {
    pub name: String,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub url_key: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub inventory_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haravan_product_decodes() {
        let json = r#"{"available":true,"handle":"horimiya-tap-8","title":"Horimiya - Tập 8","variants":[
            {"title":"Default","available":true,"price":15000000,"inventory_quantity":3,"sku":"x"}
        ],"tags":[]}"#;
        let product: HaravanProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.handle, "horimiya-tap-8");
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].price, Some(15_000_000.0));
        assert_eq!(product.variants[0].inventory_quantity, Some(3));
    }

    #[test]
    fn test_haravan_product_requires_handle() {
        let json = r#"{"available":true,"variants":[]}"#;
        assert!(serde_json::from_str::<HaravanProduct>(json).is_err());
    }

    #[test]
    fn test_meta_decodes() {
        let json = r#"{"page":{"pageType":"product"},"product":{"title":"Horimiya 8","available":false,"price":4500000}}"#;
        let meta: HaravanMeta = serde_json::from_str(json).unwrap();
        assert!(!meta.product.available);
        assert_eq!(meta.product.price, Some(4_500_000.0));
    }

    #[test]
    fn test_tiki_product_decodes() {
        let json = r#"{"id":1,"name":"Horimiya 8","url_path":"horimiya-8-p123.html?spid=456","url_key":"horimiya-8","price":40500,"inventory_type":"instock"}"#;
        let product: TikiProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.inventory_type, "instock");
        assert_eq!(product.price, Some(40500.0));
    }
}
