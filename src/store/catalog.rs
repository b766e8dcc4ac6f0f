use std::collections::HashMap;

use crate::config::ConfigError;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub description: String,
}

impl Product {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Read-only product catalog, fixed at construction
pub struct Catalog {
    home_page: String,
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build the catalog, keeping the given product order
    ///
    /// Duplicate ids are rejected.
    pub fn new(home_page: impl Into<String>, products: Vec<Product>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), pos).is_some() {
                return Err(ConfigError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self {
            home_page: home_page.into(),
            products,
            index,
        })
    }

    /// Description of the product with the given id
    pub fn product(&self, id: &str) -> Result<String, StoreError> {
        self.index
            .get(id)
            .map(|&pos| self.products[pos].description.clone())
            .ok_or_else(|| StoreError::UnknownProduct(id.to_string()))
    }

    /// All product ids in catalog order
    pub fn product_ids(&self) -> Vec<String> {
        self.products.iter().map(|p| p.id.clone()).collect()
    }

    pub fn home_page(&self) -> String {
        self.home_page.clone()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            "Welcome to the shop",
            vec![
                Product::new("seed", "Heirloom seed pack"),
                Product::new("loaf", "Sourdough loaf"),
                Product::new("mill", "Hand grain mill"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_products_in_order() {
        assert_eq!(catalog().product_ids(), vec!["seed", "loaf", "mill"]);
    }

    #[test]
    fn test_every_listed_product_resolves() {
        let catalog = catalog();
        let expected = ["Heirloom seed pack", "Sourdough loaf", "Hand grain mill"];
        for (id, description) in catalog.product_ids().iter().zip(expected) {
            assert_eq!(catalog.product(id).unwrap(), description);
        }
    }

    #[test]
    fn test_unknown_product() {
        assert!(matches!(
            catalog().product("nonexistent"),
            Err(StoreError::UnknownProduct(id)) if id == "nonexistent"
        ));
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let result = Catalog::new(
            "",
            vec![Product::new("seed", "a"), Product::new("seed", "b")],
        );
        assert!(matches!(result, Err(ConfigError::DuplicateProduct(id)) if id == "seed"));
    }

    #[test]
    fn test_home_page_and_len() {
        let catalog = catalog();
        assert_eq!(catalog.home_page(), "Welcome to the shop");
        assert_eq!(catalog.len(), 3);
        assert!(Catalog::new("", vec![]).unwrap().is_empty());
    }
}
