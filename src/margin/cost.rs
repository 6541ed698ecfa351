//! Cost proxy per category from its physical bulk.
//!
//! Weight and volume are min-max normalised across categories, blended
//! evenly and mapped onto [0.9, 1.5]. Missing attributes are imputed with
//! the median over the categories that have them.

use std::collections::HashMap;

use crate::config::{COST_FACTOR_MIN, COST_FACTOR_SPAN, NORMALIZATION_EPSILON};
use crate::models::{CategoryAggregate, CategoryEconomics};
use crate::stats;

/// Fill `None` with the median of the present values, or 0.0 when no
/// value is present at all.
pub fn impute(values: &[Option<f64>]) -> Vec<f64> {
    let fill = stats::median(values.iter().flatten().copied()).unwrap_or(0.0);
    values.iter().map(|v| v.unwrap_or(fill)).collect()
}

/// `(x - min) / (max - min + epsilon)` for every value.
///
/// Bounds are taken over the finite values only. A non-finite value, or
/// one whose normalised form is not finite, maps to 0. Results are clamped
/// to [0, 1].
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let min = finite().fold(f64::INFINITY, f64::min);
    let max = finite().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min + NORMALIZATION_EPSILON;
    values
        .iter()
        .map(|v| {
            let norm = (v - min) / range;
            if v.is_finite() && norm.is_finite() {
                norm.clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// `0.9 + 0.6 * (0.5 * weight_norm + 0.5 * volume_norm)`, element-wise.
pub fn cost_factors(weights: &[f64], volumes: &[f64]) -> Vec<f64> {
    let weight_norm = min_max_normalize(weights);
    let volume_norm = min_max_normalize(volumes);
    weight_norm
        .iter()
        .zip(&volume_norm)
        .map(|(w, v)| COST_FACTOR_MIN + COST_FACTOR_SPAN * (0.5 * w + 0.5 * v))
        .collect()
}

/// Derive cost, margin and revenue for every category.
///
/// `elasticities` maps category names to their estimate; categories absent
/// from the map get `None`.
pub fn economics(
    aggregates: Vec<CategoryAggregate>,
    elasticities: &HashMap<String, Option<f64>>,
    cost_ratio: f64,
) -> Vec<CategoryEconomics> {
    let column = |f: fn(&CategoryAggregate) -> Option<f64>| -> Vec<f64> {
        impute(&aggregates.iter().map(f).collect::<Vec<_>>())
    };
    let weights = column(|a| a.avg_weight_g);
    let lengths = column(|a| a.avg_length_cm);
    let heights = column(|a| a.avg_height_cm);
    let widths = column(|a| a.avg_width_cm);

    let volumes: Vec<f64> = lengths
        .iter()
        .zip(&heights)
        .zip(&widths)
        .map(|((l, h), w)| l * h * w)
        .collect();
    let factors = cost_factors(&weights, &volumes);

    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, agg)| {
            let qty = agg.qty_sold as f64;
            let cost_factor = factors[i];
            let estimated_cost_unit = agg.avg_price * cost_ratio * cost_factor;
            let realized_margin_unit = agg.avg_price - agg.avg_freight - estimated_cost_unit;
            let price_elasticity = elasticities.get(&agg.category).copied().flatten();

            CategoryEconomics {
                qty_sold: agg.qty_sold,
                avg_price: agg.avg_price,
                median_price: agg.median_price,
                avg_freight: agg.avg_freight,
                avg_weight_g: weights[i],
                volume_cm3: volumes[i],
                cost_factor,
                estimated_cost_unit,
                realized_margin_unit,
                current_revenue_total: agg.avg_price * qty,
                current_margin_total: realized_margin_unit * qty,
                price_elasticity,
                category: agg.category,
            }
        })
        .collect()
}
