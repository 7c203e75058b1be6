//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    Available,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out Of Stock")]
    OutOfStock,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl ProductStatus {
    /// Whether customers may order a product in this status
    pub fn is_orderable(self) -> bool {
        matches!(self, Self::Available | Self::LowStock)
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Category name (filled from the enclosing group when flattened)
    #[serde(default, rename = "categoryName")]
    pub category_name: String,
    /// Unit sale price
    #[serde(rename = "saleprice", with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    /// Available quantity
    pub quantity: u32,
    pub status: ProductStatus,
    /// Image path relative to the API base URL
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Absolute image URL, if the product has an image
    pub fn image_url(&self, base_url: &str) -> Option<String> {
        self.image
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", base_url.trim_end_matches('/'), p))
    }
}

/// Products of one category, as grouped by `GET /productlist`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProducts {
    pub category_name: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// `GET /productlist` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<CategoryProducts>,
}

impl ProductCatalog {
    /// Flatten the category groups into orderable products.
    ///
    /// Each product inherits its group's category name. Products whose
    /// status is not orderable are dropped.
    pub fn into_orderable(self) -> Vec<Product> {
        self.products
            .into_iter()
            .flat_map(|group| {
                let category = group.category_name;
                group.products.into_iter().map(move |mut p| {
                    p.category_name = category.clone();
                    p
                })
            })
            .filter(|p| p.status.is_orderable())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    const CATALOG: &str = r#"{
        "products": [
            {
                "categoryName": "Drinks",
                "products": [
                    { "_id": "p1", "name": "Water", "saleprice": 10.0, "quantity": 5, "status": "Available" },
                    { "_id": "p2", "name": "Juice", "saleprice": 25.5, "quantity": 2, "status": "Low Stock", "image": "/uploads/juice.png" }
                ]
            },
            {
                "categoryName": "Snacks",
                "products": [
                    { "_id": "p3", "name": "Chips", "saleprice": 12.0, "quantity": 0, "status": "Out Of Stock" },
                    { "_id": "p4", "name": "Nuts", "saleprice": 8.0, "quantity": 3, "status": "Discontinued" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_catalog_flattens_and_filters() {
        let catalog: ProductCatalog = serde_json::from_str(CATALOG).unwrap();
        let products = catalog.into_orderable();

        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(products[0].category_name, "Drinks");
        assert_eq!(products[1].status, ProductStatus::LowStock);
        assert_eq!(products[1].sale_price, dec("25.5"));
    }

    #[test]
    fn test_unknown_status() {
        let catalog: ProductCatalog = serde_json::from_str(CATALOG).unwrap();
        let nuts = &catalog.products[1].products[1];
        assert_eq!(nuts.status, ProductStatus::Unknown);
        assert!(!nuts.status.is_orderable());
    }

    #[test]
    fn test_image_url() {
        let catalog: ProductCatalog = serde_json::from_str(CATALOG).unwrap();
        let products = catalog.into_orderable();
        assert_eq!(products[0].image_url("http://localhost:3001"), None);
        assert_eq!(
            products[1].image_url("http://localhost:3001/").as_deref(),
            Some("http://localhost:3001/uploads/juice.png")
        );
    }
}
