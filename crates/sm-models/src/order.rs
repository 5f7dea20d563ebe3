//! Order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sm_core::traits::{Entity, Id, Identifiable, Timestamped};
use sm_core::types::Money;

use crate::milestone::OrderMilestone;

/// Coarse order status derived from production milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Created,
    InProduction,
    FittingReady,
    ReadyForDelivery,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::FittingReady => "FITTING_READY",
            OrderStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
        }
    }
}

/// A garment order placed by a customer with a tailor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Option<Id>,
    pub customer_id: Id,
    pub tailor_id: Id,
    pub total_amount: Money,
    /// Delivery date promised when the order was placed
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub milestones: Vec<OrderMilestone>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: Id, tailor_id: Id, total_amount: Money, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            customer_id,
            tailor_id,
            total_amount,
            estimated_delivery: None,
            milestones: Vec::new(),
            created_at,
        }
    }

    pub fn with_estimated_delivery(mut self, date: DateTime<Utc>) -> Self {
        self.estimated_delivery = Some(date);
        self
    }

    /// Append a milestone, scoping it to this order
    pub fn push_milestone(&mut self, mut milestone: OrderMilestone) {
        if let Some(id) = self.id {
            milestone.order_id = Some(id);
        }
        self.milestones.push(milestone);
    }
}

impl Identifiable for Order {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Order {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Order {
    const TYPE_NAME: &'static str = "Order";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::MilestoneStage;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_push_milestone_scopes_to_order() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut order = Order::new(Uuid::new_v4(), Uuid::new_v4(), Money::ghs(50_000), created);
        let order_id = Uuid::new_v4();
        order.id = Some(order_id);

        order.push_milestone(OrderMilestone::approved(MilestoneStage::FabricSelected, created));
        assert_eq!(order.milestones[0].order_id, Some(order_id));
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_value(OrderStatus::InProduction).unwrap();
        assert_eq!(json, "IN_PRODUCTION");
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }
}
