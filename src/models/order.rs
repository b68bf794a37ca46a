use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::position::GeoPoint;
use crate::models::status::{OrderStatus, StatusVocabulary};

const TOTAL_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub product_id: String,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub items: Vec<OrderItem>,
    pub position: GeoPoint,
    pub status: OrderStatus,
    pub total: f64,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn to_document(&self, vocabulary: &StatusVocabulary) -> OrderDocument {
        OrderDocument {
            id: self.id.clone(),
            created_at: self.created_at,
            customer_id: self.customer_id.clone(),
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
            delivery_address: self.delivery_address.clone(),
            items: self.items.clone(),
            latitude: self.position.lat,
            longitude: self.position.lng,
            status: vocabulary.label(self.status).to_string(),
            total: self.total,
            updated_at: self.updated_at,
        }
    }
}

/// Field names match the external document-store collection exactly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub items: Vec<OrderItem>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub total: f64,
    pub updated_at: DateTime<Utc>,
}

/// An order as handed over by the external ordering system, before the store
/// has assigned an id and timestamps.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub items: Vec<OrderItem>,
    pub position: GeoPoint,
    pub total: f64,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "customer name cannot be empty".to_string(),
            ));
        }

        self.position.validate()?;

        let items_total: f64 = self.items.iter().map(OrderItem::line_total).sum();
        if (items_total - self.total).abs() > TOTAL_TOLERANCE {
            return Err(AppError::BadRequest(format!(
                "total {} does not match item sum {items_total}",
                self.total
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NewOrder, OrderItem};
    use crate::models::position::GeoPoint;

    fn draft(total: f64) -> NewOrder {
        NewOrder {
            customer_id: "c-1".to_string(),
            customer_name: "Asha".to_string(),
            customer_phone: "+91 90000 00000".to_string(),
            delivery_address: "12 Beach Road".to_string(),
            items: vec![
                OrderItem {
                    name: "Tomatoes".to_string(),
                    price: 40.0,
                    product_id: "p-1".to_string(),
                    quantity: 2,
                },
                OrderItem {
                    name: "Rice".to_string(),
                    price: 120.0,
                    product_id: "p-2".to_string(),
                    quantity: 1,
                },
            ],
            position: GeoPoint {
                lat: 13.0827,
                lng: 80.2707,
            },
            total,
        }
    }

    #[test]
    fn accepts_total_matching_item_sum() {
        assert!(draft(200.0).validate().is_ok());
    }

    #[test]
    fn rejects_total_mismatch() {
        assert!(draft(180.0).validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_position() {
        let mut order = draft(200.0);
        order.position.lat = 123.0;
        assert!(order.validate().is_err());
    }

    #[test]
    fn rejects_blank_customer_name() {
        let mut order = draft(200.0);
        order.customer_name = "  ".to_string();
        assert!(order.validate().is_err());
    }
}
