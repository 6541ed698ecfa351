use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Product — Catalog entry with category and physical attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(rename = "product_category_name")]
    pub category: Option<String>,
    #[serde(rename = "product_weight_g")]
    pub weight_g: Option<f64>,
    #[serde(rename = "product_length_cm")]
    pub length_cm: Option<f64>,
    #[serde(rename = "product_height_cm")]
    pub height_cm: Option<f64>,
    #[serde(rename = "product_width_cm")]
    pub width_cm: Option<f64>,
}

impl Product {
    /// A product with a category and no physical attributes.
    pub fn new(product_id: &str, category: Option<&str>) -> Self {
        Self {
            product_id: product_id.to_string(),
            category: category.map(|c| c.to_string()),
            ..Self::default()
        }
    }

    pub fn with_dimensions(
        mut self,
        weight_g: Option<f64>,
        length_cm: Option<f64>,
        height_cm: Option<f64>,
        width_cm: Option<f64>,
    ) -> Self {
        self.weight_g = weight_g;
        self.length_cm = length_cm;
        self.height_cm = height_cm;
        self.width_cm = width_cm;
        self
    }
}
