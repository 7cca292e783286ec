use uuid::Uuid;

use crate::domain::month_year::MonthYear;
use crate::domain::price::Price;
use crate::domain::service_name::ServiceName;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Subscription {
    pub service_name: ServiceName,
    pub price: Price,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<MonthYear>,
}

/// Natural key of a subscription. There is no surrogate id.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionKey {
    pub user_id: Uuid,
    pub service_name: ServiceName,
    pub start_date: MonthYear,
}

/// The only mutable fields of a subscription. Both are replaced on update,
/// so a missing `end_date` clears the stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub price: Price,
    pub end_date: Option<MonthYear>,
}

impl Subscription {
    pub fn key(&self) -> SubscriptionKey {
        SubscriptionKey {
            user_id: self.user_id,
            service_name: self.service_name.clone(),
            start_date: self.start_date,
        }
    }
}
