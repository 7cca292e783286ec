mod error;
mod health_check;
mod subscriptions;
mod subscriptions_by_key;
mod subscriptions_total_price;

pub use error::{json_error_handler, query_error_handler, SubscriptionError};
pub use health_check::health_check;
pub use subscriptions::{handle_create_subscription, handle_list_subscriptions};
pub use subscriptions_by_key::{
    handle_delete_subscription, handle_get_subscription, handle_update_subscription,
};
pub use subscriptions_total_price::handle_total_price;
