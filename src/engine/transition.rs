use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::error::AppError;
use crate::models::order::Order;
use crate::models::status::OrderStatus;
use crate::store::OrderStore;

/// Which status transitions the service accepts. The standard flow never
/// leaves `delivered`; one deployment of the original system allowed moving
/// an order to any of the three states, kept here behind `free_form`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionPolicy {
    pub free_form: bool,
}

impl TransitionPolicy {
    pub fn standard() -> Self {
        Self { free_form: false }
    }

    pub fn free_form() -> Self {
        Self { free_form: true }
    }
}

pub fn validate_transition(
    from: OrderStatus,
    to: OrderStatus,
    policy: &TransitionPolicy,
) -> Result<(), AppError> {
    if policy.free_form {
        return Ok(());
    }

    let allowed = matches!(
        (from, to),
        (OrderStatus::Pending, OrderStatus::InProgress)
            | (OrderStatus::Pending, OrderStatus::Delivered)
            | (OrderStatus::InProgress, OrderStatus::Delivered)
    );

    if allowed {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!(
            "cannot move order from {} to {}",
            from.canonical(),
            to.canonical()
        )))
    }
}

/// Validates and applies one status transition through the store. The write
/// carries `{status, updatedAt}` as a single atomic update; on failure the
/// order keeps its previous state. At most one transition per order may be
/// in flight at a time.
pub async fn apply_status_transition(
    store: &dyn OrderStore,
    in_flight: &DashMap<String, ()>,
    policy: &TransitionPolicy,
    id: &str,
    next: OrderStatus,
) -> Result<Order, AppError> {
    let current = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    validate_transition(current.status, next, policy)?;

    match in_flight.entry(id.to_string()) {
        Entry::Occupied(_) => {
            return Err(AppError::Conflict(format!(
                "status update for order {id} already in flight"
            )));
        }
        Entry::Vacant(slot) => {
            slot.insert(());
        }
    }

    let result = store.update_status(id, next, Utc::now()).await;
    in_flight.remove(id);

    let order = result?;
    info!(
        order_id = %order.id,
        from = current.status.canonical(),
        to = order.status.canonical(),
        "order status updated"
    );

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::{TransitionPolicy, validate_transition};
    use crate::models::status::OrderStatus;

    #[test]
    fn standard_flow_allows_forward_transitions() {
        let policy = TransitionPolicy::standard();

        for (from, to) in [
            (OrderStatus::Pending, OrderStatus::InProgress),
            (OrderStatus::Pending, OrderStatus::Delivered),
            (OrderStatus::InProgress, OrderStatus::Delivered),
        ] {
            assert!(validate_transition(from, to, &policy).is_ok());
        }
    }

    #[test]
    fn standard_flow_rejects_leaving_delivered() {
        let policy = TransitionPolicy::standard();

        for to in [OrderStatus::Pending, OrderStatus::InProgress] {
            assert!(validate_transition(OrderStatus::Delivered, to, &policy).is_err());
        }
    }

    #[test]
    fn standard_flow_rejects_moving_backwards() {
        let policy = TransitionPolicy::standard();
        assert!(
            validate_transition(OrderStatus::InProgress, OrderStatus::Pending, &policy).is_err()
        );
    }

    #[test]
    fn free_form_policy_allows_any_target_state() {
        let policy = TransitionPolicy::free_form();

        for from in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::Delivered,
        ] {
            for to in [
                OrderStatus::Pending,
                OrderStatus::InProgress,
                OrderStatus::Delivered,
            ] {
                assert!(validate_transition(from, to, &policy).is_ok());
            }
        }
    }
}
