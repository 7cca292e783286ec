use serde::Deserialize;
use uuid::Uuid;

use crate::domain::month_year::MonthYear;
use crate::domain::price::Price;
use crate::domain::service_name::ServiceName;
use crate::domain::subscription::{Subscription, SubscriptionKey, SubscriptionUpdate};
use crate::domain::validation_error::ValidationError;

#[derive(Deserialize, Debug)]
pub struct NewSubscriptionBody {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SubscriptionUpdateBody {
    pub price: i64,
    pub end_date: Option<String>,
}

/// Identity segments of `/subscriptions/{user_id}/{service_name}/{start_date}`.
#[derive(Deserialize, Debug)]
pub struct SubscriptionPath {
    pub user_id: String,
    pub service_name: String,
    pub start_date: String,
}

pub fn parse_user_id(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|err| ValidationError::new(field, err.to_string()))
}

pub fn parse_month_year(field: &'static str, value: &str) -> Result<MonthYear, ValidationError> {
    MonthYear::parse(value).map_err(|err| ValidationError::new(field, err.to_string()))
}

fn parse_optional_month_year(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<MonthYear>, ValidationError> {
    value.map(|value| parse_month_year(field, value)).transpose()
}

impl TryFrom<NewSubscriptionBody> for Subscription {
    type Error = ValidationError;

    fn try_from(body: NewSubscriptionBody) -> Result<Self, Self::Error> {
        let service_name = ServiceName::parse(body.service_name)
            .map_err(|reason| ValidationError::new("service_name", reason))?;
        let price =
            Price::parse(body.price).map_err(|reason| ValidationError::new("price", reason))?;
        let user_id = parse_user_id("user_id", &body.user_id)?;
        let start_date = parse_month_year("start_date", &body.start_date)?;
        let end_date = parse_optional_month_year("end_date", body.end_date.as_deref())?;

        Ok(Subscription {
            service_name,
            price,
            user_id,
            start_date,
            end_date,
        })
    }
}

impl TryFrom<SubscriptionUpdateBody> for SubscriptionUpdate {
    type Error = ValidationError;

    fn try_from(body: SubscriptionUpdateBody) -> Result<Self, Self::Error> {
        let price =
            Price::parse(body.price).map_err(|reason| ValidationError::new("price", reason))?;
        let end_date = parse_optional_month_year("end_date", body.end_date.as_deref())?;

        Ok(SubscriptionUpdate { price, end_date })
    }
}

impl TryFrom<SubscriptionPath> for SubscriptionKey {
    type Error = ValidationError;

    fn try_from(path: SubscriptionPath) -> Result<Self, Self::Error> {
        let user_id = parse_user_id("user_id", &path.user_id)?;
        let service_name = ServiceName::parse(path.service_name)
            .map_err(|reason| ValidationError::new("service_name", reason))?;
        let start_date = parse_month_year("start_date", &path.start_date)?;

        Ok(SubscriptionKey {
            user_id,
            service_name,
            start_date,
        })
    }
}
