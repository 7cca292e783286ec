use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    domain::{
        new_subscription::{parse_month_year, parse_user_id, NewSubscriptionBody},
        subscription::Subscription,
    },
    routes::error::SubscriptionError,
    subscription_store::{SubscriptionFilter, SubscriptionStore},
};

#[derive(serde::Serialize)]
pub struct Acknowledgement {
    pub message: &'static str,
}

#[derive(Deserialize, Debug)]
pub struct ListParameters {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[tracing::instrument(
    name = "Creating a new subscription handler",
    skip(body, store),
    fields(
        user_id = %body.user_id,
        service_name = %body.service_name,
        start_date = %body.start_date
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriptionBody>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let subscription = Subscription::try_from(body.into_inner()).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        SubscriptionError::Validation(err)
    })?;

    store.create(&subscription).await?;

    Ok(HttpResponse::Created().json(Acknowledgement {
        message: "subscription created",
    }))
}

#[tracing::instrument(name = "Listing subscriptions handler", skip(store))]
pub async fn handle_list_subscriptions(
    parameters: web::Query<ListParameters>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let filter = parse_list_parameters(parameters.into_inner())?;
    let subscriptions = store.list(&filter).await?;

    Ok(HttpResponse::Ok().json(subscriptions))
}

/// Present but empty parameters count as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn parse_list_parameters(
    parameters: ListParameters,
) -> Result<SubscriptionFilter, SubscriptionError> {
    let user_id = non_empty(parameters.user_id)
        .map(|user_id| parse_user_id("user_id", &user_id))
        .transpose()?;
    let start_date_from = non_empty(parameters.start_date)
        .map(|start_date| parse_month_year("start_date", &start_date))
        .transpose()?;
    let start_date_to = non_empty(parameters.end_date)
        .map(|end_date| parse_month_year("end_date", &end_date))
        .transpose()?;

    Ok(SubscriptionFilter {
        user_id,
        service_name: non_empty(parameters.service_name),
        start_date_from,
        start_date_to,
    })
}
