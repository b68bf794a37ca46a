use std::collections::HashMap;

use crate::models::order::Order;
use crate::models::status::OrderStatus;

/// Read-side projection behind the status filter tabs. `None` means "all".
pub fn filter_by_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| status.is_none_or(|wanted| order.status == wanted))
        .cloned()
        .collect()
}

pub fn status_counts(orders: &[Order]) -> HashMap<OrderStatus, usize> {
    let mut counts = HashMap::new();
    for order in orders {
        *counts.entry(order.status).or_insert(0) += 1;
    }
    counts
}
