use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(default)]
    pub uid: u64,
    #[serde(default)]
    pub product_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// Result of a purchase. Fields the producer adds beyond the known ones are
/// kept in `extra` so printing an order loses nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub fixed_cost: f64,
    #[serde(default)]
    pub billing_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default)]
    pub product: Product,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Billed amount divided across the delivered units.
    pub fn effective_unit_cost(&self) -> Option<f64> {
        (self.quantity > 0).then(|| self.billing_amount / f64::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_keeps_unknown_fields() {
        let order: Order = serde_json::from_value(json!({
            "quantity": 1000,
            "unit_price": 3.0,
            "fixed_cost": 10.0,
            "billing_amount": 3010.0,
            "stock": 1000,
            "product": {"uid": 11, "product_id": 1, "name": "CD_1", "quality": 1, "signature": "s"},
            "left_in_stock": 42
        }))
        .unwrap();

        assert_eq!(order.product.name, "CD_1");
        assert_eq!(order.stock, Some(1000));
        assert_eq!(order.extra["left_in_stock"], 42);
        assert_eq!(order.effective_unit_cost(), Some(3.01));

        let printed = serde_json::to_value(&order).unwrap();
        assert_eq!(printed["left_in_stock"], 42);
    }

    #[test]
    fn empty_order_has_no_unit_cost() {
        assert_eq!(Order::default().effective_unit_cost(), None);
    }
}
