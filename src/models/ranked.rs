use serde::Serialize;

use crate::models::order::{Order, OrderDocument};
use crate::models::status::StatusVocabulary;

/// An order annotated with its distance from the driver. Derived on every
/// ranking pass, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedOrder {
    pub order: Order,
    pub distance_m: f64,
}

impl RankedOrder {
    pub fn to_view(&self, vocabulary: &StatusVocabulary) -> RankedOrderView {
        RankedOrderView {
            order: self.order.to_document(vocabulary),
            distance_meters: self.distance_m,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedOrderView {
    #[serde(flatten)]
    pub order: OrderDocument,
    pub distance_meters: f64,
}
