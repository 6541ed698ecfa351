//! Join of order items to products and the two grouping passes over it.

use std::collections::{BTreeMap, HashMap};

use crate::models::{CategoryAggregate, OrderItem, Product, ProductAggregate};
use crate::stats;

/// An order item with the product it references, if any.
#[derive(Debug, Clone, Copy)]
pub struct JoinedItem<'a> {
    pub item: &'a OrderItem,
    pub product: Option<&'a Product>,
}

impl<'a> JoinedItem<'a> {
    /// Category of the product; blank names count as missing.
    pub fn category(&self) -> Option<&'a str> {
        self.product
            .and_then(|p| p.category.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

/// Left join of items to products on `product_id`.
///
/// Items whose product is unknown keep `product: None`. When the product
/// table repeats an id, the first row wins.
pub fn join_items<'a>(items: &'a [OrderItem], products: &'a [Product]) -> Vec<JoinedItem<'a>> {
    let mut by_id: HashMap<&str, &Product> = HashMap::with_capacity(products.len());
    for product in products {
        by_id.entry(product.product_id.as_str()).or_insert(product);
    }

    items
        .iter()
        .map(|item| JoinedItem {
            item,
            product: by_id.get(item.product_id.as_str()).copied(),
        })
        .collect()
}

#[derive(Default)]
struct CategoryAccumulator {
    prices: Vec<f64>,
    freight_sum: f64,
    weights: Vec<f64>,
    lengths: Vec<f64>,
    heights: Vec<f64>,
    widths: Vec<f64>,
}

impl CategoryAccumulator {
    fn push(&mut self, row: &JoinedItem<'_>) {
        self.prices.push(row.item.price);
        self.freight_sum += row.item.freight_value;
        if let Some(p) = row.product {
            self.weights.extend(p.weight_g);
            self.lengths.extend(p.length_cm);
            self.heights.extend(p.height_cm);
            self.widths.extend(p.width_cm);
        }
    }

    fn finish(self, category: &str) -> CategoryAggregate {
        let qty = self.prices.len();
        let price_sum: f64 = self.prices.iter().sum();
        CategoryAggregate {
            category: category.to_string(),
            qty_sold: qty as u64,
            avg_price: price_sum / qty as f64,
            median_price: stats::median(self.prices).unwrap_or(0.0),
            avg_freight: self.freight_sum / qty as f64,
            avg_weight_g: stats::median(self.weights),
            avg_length_cm: stats::median(self.lengths),
            avg_height_cm: stats::median(self.heights),
            avg_width_cm: stats::median(self.widths),
        }
    }
}

/// One aggregate per category, ordered by category name.
///
/// Items without a category are not counted anywhere.
pub fn category_aggregates(joined: &[JoinedItem<'_>]) -> Vec<CategoryAggregate> {
    let mut groups: BTreeMap<&str, CategoryAccumulator> = BTreeMap::new();
    for row in joined {
        if let Some(category) = row.category() {
            groups.entry(category).or_default().push(row);
        }
    }

    groups
        .into_iter()
        .map(|(category, acc)| acc.finish(category))
        .collect()
}

/// Item count and mean price per (category, product), ordered by both keys.
pub fn product_aggregates(joined: &[JoinedItem<'_>]) -> Vec<ProductAggregate> {
    let mut groups: BTreeMap<(&str, &str), (u64, f64)> = BTreeMap::new();
    for row in joined {
        if let Some(category) = row.category() {
            let entry = groups
                .entry((category, row.item.product_id.as_str()))
                .or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += row.item.price;
        }
    }

    groups
        .into_iter()
        .map(|((category, product_id), (count, price_sum))| ProductAggregate {
            category: category.to_string(),
            product_id: product_id.to_string(),
            qty_sold_prod: count,
            avg_price_prod: price_sum / count as f64,
        })
        .collect()
}
