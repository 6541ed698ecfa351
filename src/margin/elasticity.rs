//! Price elasticity per category from product-level variation.
//!
//! Within a category, `ln(qty_sold_prod)` is regressed on
//! `ln(avg_price_prod)` across products; the slope is the elasticity.

use std::collections::HashMap;

use crate::config::MIN_ELASTICITY_SAMPLES;
use crate::models::ProductAggregate;

/// Slope of the ordinary least squares line through `(xs, ys)`.
///
/// Returns `None` for fewer than two points, mismatched lengths, zero
/// variance in `xs` or a non-finite result.
pub fn ols_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    // rounding in the mean leaves a residue when every x is equal
    let scale = mean_x.abs().max(1.0);
    if !sxx.is_finite() || sxx <= nf * (f64::EPSILON * scale).powi(2) * 16.0 {
        return None;
    }
    let slope = sxy / sxx;
    slope.is_finite().then_some(slope)
}

/// Elasticity for one category's products.
///
/// Only products with a positive mean price and at least one sale count;
/// fewer than five of them yields `None`.
pub fn estimate<'a, I>(products: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a ProductAggregate>,
{
    let (xs, ys): (Vec<f64>, Vec<f64>) = products
        .into_iter()
        .filter(|p| p.avg_price_prod > 0.0 && p.qty_sold_prod > 0)
        .map(|p| (p.avg_price_prod.ln(), (p.qty_sold_prod as f64).ln()))
        .unzip();

    if xs.len() < MIN_ELASTICITY_SAMPLES {
        return None;
    }
    ols_slope(&xs, &ys)
}

/// Elasticity estimate for every category present in `products`.
pub fn estimate_all(products: &[ProductAggregate]) -> HashMap<String, Option<f64>> {
    let mut by_category: HashMap<&str, Vec<&ProductAggregate>> = HashMap::new();
    for p in products {
        by_category.entry(p.category.as_str()).or_default().push(p);
    }

    by_category
        .into_iter()
        .map(|(category, rows)| (category.to_string(), estimate(rows)))
        .collect()
}
