//! Customer lifetime value by installment segment.
//!
//! Payments are joined to their orders, summed per customer and bucketed by
//! the customer's mean number of installments (rounded half to even).

use tracing::debug;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::InstallmentSegment;
use crate::sql_builder::{numeric_or_null, numeric_or_zero};

/// Query interface over `order_payments` and `orders`.
pub struct InstallmentQuery<'a> {
    conn: &'a Connection,
}

impl<'a> InstallmentQuery<'a> {
    /// Create a new `InstallmentQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// One row per installment segment, ordered by segment name.
    ///
    /// Segments: `no_installments` (at most 1), `low_2_3`, `mid_4_6` and
    /// `high_7_plus`. Missing installment counts read as 1, missing payment
    /// values as 0. Payments whose order is unknown are ignored.
    pub fn summary(&self) -> Result<Vec<InstallmentSegment>> {
        self.conn.ensure_tables(&["order_payments", "orders"])?;
        self.conn.require_columns(
            "order_payments",
            &["order_id", "payment_value", "payment_installments"],
        )?;
        self.conn.require_columns("orders", &["order_id", "customer_id"])?;

        let sql = format!(
            r#"
            WITH payments AS (
                SELECT p.order_id,
                       o.customer_id,
                       {value} AS payment_value,
                       COALESCE({installments}, CAST(1 AS DOUBLE)) AS installments
                FROM order_payments p
                LEFT JOIN orders o ON p.order_id = o.order_id
            ),
            ltv AS (
                SELECT customer_id,
                       SUM(payment_value) AS total_revenue,
                       COUNT(DISTINCT order_id) AS n_orders,
                       AVG(installments) AS avg_installments
                FROM payments
                WHERE customer_id IS NOT NULL
                GROUP BY customer_id
            ),
            segmented AS (
                SELECT *,
                       CASE
                           WHEN round_even(avg_installments, 0) <= 1 THEN 'no_installments'
                           WHEN round_even(avg_installments, 0) <= 3 THEN 'low_2_3'
                           WHEN round_even(avg_installments, 0) <= 6 THEN 'mid_4_6'
                           ELSE 'high_7_plus'
                       END AS install_segment
                FROM ltv
            )
            SELECT install_segment,
                   COUNT(customer_id) AS customers,
                   AVG(total_revenue) AS avg_ltv,
                   MEDIAN(total_revenue) AS median_ltv,
                   AVG(n_orders) AS avg_orders
            FROM segmented
            GROUP BY install_segment
            ORDER BY install_segment
            "#,
            value = numeric_or_zero("p.payment_value"),
            installments = numeric_or_null("p.payment_installments"),
        );

        let rows: Vec<InstallmentSegment> = self.conn.execute_into(&sql, &[])?;
        debug!(segments = rows.len(), "summarised installment segments");
        Ok(rows)
    }
}
