pub mod month_year;
pub mod new_subscription;
pub mod price;
pub mod service_name;
pub mod subscription;
pub mod validation_error;
