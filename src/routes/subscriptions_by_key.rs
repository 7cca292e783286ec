use actix_web::{web, HttpResponse};

use crate::{
    domain::{
        new_subscription::{SubscriptionPath, SubscriptionUpdateBody},
        subscription::{SubscriptionKey, SubscriptionUpdate},
    },
    routes::{error::SubscriptionError, subscriptions::Acknowledgement},
    subscription_store::SubscriptionStore,
};

fn parse_key(path: web::Path<SubscriptionPath>) -> Result<SubscriptionKey, SubscriptionError> {
    SubscriptionKey::try_from(path.into_inner()).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        SubscriptionError::Validation(err)
    })
}

#[tracing::instrument(name = "Fetching a subscription handler", skip(store))]
pub async fn handle_get_subscription(
    path: web::Path<SubscriptionPath>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let key = parse_key(path)?;

    match store.get(&key).await? {
        Some(subscription) => Ok(HttpResponse::Ok().json(subscription)),
        None => Err(SubscriptionError::NotFound),
    }
}

#[tracing::instrument(name = "Updating a subscription handler", skip(store))]
pub async fn handle_update_subscription(
    path: web::Path<SubscriptionPath>,
    body: web::Json<SubscriptionUpdateBody>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let key = parse_key(path)?;
    let update = SubscriptionUpdate::try_from(body.into_inner()).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        SubscriptionError::Validation(err)
    })?;

    if store.update(&key, &update).await? == 0 {
        return Err(SubscriptionError::NotFound);
    }

    Ok(HttpResponse::Ok().json(Acknowledgement {
        message: "subscription updated",
    }))
}

#[tracing::instrument(name = "Deleting a subscription handler", skip(store))]
pub async fn handle_delete_subscription(
    path: web::Path<SubscriptionPath>,
    store: web::Data<SubscriptionStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let key = parse_key(path)?;

    if store.delete(&key).await? == 0 {
        return Err(SubscriptionError::NotFound);
    }

    Ok(HttpResponse::Ok().json(Acknowledgement {
        message: "subscription deleted",
    }))
}
