use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    domain::new_subscription::{parse_month_year, parse_user_id},
    routes::{error::SubscriptionError, subscriptions::non_empty},
    subscription_store::{SubscriptionStore, TotalPriceFilter},
};

#[derive(Deserialize, Debug)]
pub struct TotalPriceParameters {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from_date: String,
    pub to_date: String,
}

#[derive(serde::Serialize)]
pub struct TotalPrice {
    pub total_price: i64,
}

#[tracing::instrument(name = "Calculating the total price handler", skip(store))]
pub async fn handle_total_price(
    parameters: web::Query<TotalPriceParameters>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let parameters = parameters.into_inner();
    let filter = TotalPriceFilter {
        from_date: parse_month_year("from_date", &parameters.from_date)?,
        to_date: parse_month_year("to_date", &parameters.to_date)?,
        user_id: non_empty(parameters.user_id)
            .map(|user_id| parse_user_id("user_id", &user_id))
            .transpose()?,
        service_name: non_empty(parameters.service_name),
    };

    let total_price = store.sum_price(&filter).await?;

    tracing::info!("Total price of subscriptions = {}", total_price);

    Ok(HttpResponse::Ok().json(TotalPrice { total_price }))
}
