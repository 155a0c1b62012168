//! Core product domain types.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a product.
pub type ProductId = i64;

/// An item in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The ID of the product.
    pub id: ProductId,
    /// The display name of the product.
    pub name: String,
    /// The price in the smallest currency unit.
    pub price: u32,
    /// The rating out of 255.
    pub rating: u8,
    /// A URL or path to the product image.
    pub image: String,
}

/// The request body for adding a product to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    /// The display name of the product.
    pub name: String,
    /// The price in the smallest currency unit.
    pub price: u32,
    /// The rating out of 255.
    #[serde(default)]
    pub rating: u8,
    /// A URL or path to the product image.
    #[serde(default)]
    pub image: String,
}

impl NewProduct {
    /// Trim the product name and check that it is not empty.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the name is empty or just whitespace.
    pub fn validate(self) -> Result<Self, Error> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(Error::Validation("product name cannot be empty".to_owned()));
        }

        Ok(Self {
            name: name.to_owned(),
            ..self
        })
    }
}

/// Query parameters for searching the catalog, e.g. `?name=choc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod new_product_tests {
    use crate::Error;

    use super::NewProduct;

    #[test]
    fn validate_fails_on_blank_name() {
        let product = NewProduct {
            name: " \t".to_owned(),
            price: 100,
            rating: 4,
            image: String::new(),
        };

        assert!(matches!(product.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn validate_trims_name() {
        let product = NewProduct {
            name: "  Chocolate ".to_owned(),
            price: 100,
            rating: 4,
            image: String::new(),
        };

        assert_eq!(product.validate().unwrap().name, "Chocolate");
    }
}
