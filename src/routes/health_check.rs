use actix_web::HttpResponse;

/// Liveness probe. Does not touch the database.
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
