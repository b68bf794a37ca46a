use crate::geo::haversine_m;
use crate::models::order::Order;
use crate::models::position::GeoPoint;
use crate::models::ranked::RankedOrder;

/// Annotates each order with its distance from the driver and sorts ascending.
/// The sort is stable, so equidistant orders keep their snapshot order.
pub fn rank(driver: &GeoPoint, orders: &[Order]) -> Vec<RankedOrder> {
    let mut ranked: Vec<RankedOrder> = orders
        .iter()
        .map(|order| RankedOrder {
            distance_m: haversine_m(driver, &order.position),
            order: order.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    ranked
}
