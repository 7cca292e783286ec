use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::month_year::MonthYear;
use crate::domain::price::Price;
use crate::domain::service_name::ServiceName;
use crate::domain::subscription::{Subscription, SubscriptionKey, SubscriptionUpdate};

const SELECT_SUBSCRIPTIONS: &str = r#"
    SELECT service_name, price, user_id, start_date, end_date
    FROM subscriptions
    WHERE TRUE
"#;

/// Gateway to the `subscriptions` table. Every operation is a single statement
/// run on a pooled connection, so there are no explicit transactions.
pub struct SubscriptionStore {
    db_pool: PgPool,
}

/// Optional narrowing for [`SubscriptionStore::list`]. Absent filters impose
/// no constraint; present ones are combined with `AND`.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the service name.
    pub service_name: Option<String>,
    /// Inclusive lower bound on `start_date`.
    pub start_date_from: Option<MonthYear>,
    /// Inclusive upper bound on `start_date`.
    pub start_date_to: Option<MonthYear>,
}

/// Range for [`SubscriptionStore::sum_price`]. Both bounds are inclusive and
/// only compared against `start_date`.
#[derive(Debug, Clone)]
pub struct TotalPriceFilter {
    pub from_date: MonthYear,
    pub to_date: MonthYear,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Failed to insert the subscription into the database.")]
    Insert(#[source] sqlx::Error),
    #[error("Failed to fetch subscriptions from the database.")]
    Fetch(#[source] sqlx::Error),
    #[error("Failed to update the subscription in the database.")]
    Update(#[source] sqlx::Error),
    #[error("Failed to delete the subscription from the database.")]
    Delete(#[source] sqlx::Error),
    #[error("Failed to calculate the total price of subscriptions.")]
    Aggregate(#[source] sqlx::Error),
}

impl SubscriptionStore {
    pub fn new(db_pool: PgPool) -> SubscriptionStore {
        SubscriptionStore { db_pool }
    }

    #[tracing::instrument(
        name = "Insert a new subscription into the database",
        skip(self, subscription),
        fields(
            user_id = %subscription.user_id,
            service_name = %subscription.service_name.as_ref(),
            start_date = %subscription.start_date
        )
    )]
    pub async fn create(&self, subscription: &Subscription) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(subscription.service_name.as_ref())
        .bind(subscription.price.value())
        .bind(subscription.user_id)
        .bind(subscription.start_date.first_day())
        .bind(subscription.end_date.map(|end_date| end_date.first_day()))
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StorageError::Insert(err)
        })?;

        Ok(())
    }

    /// A missing row is `Ok(None)`, not an error.
    #[tracing::instrument(
        name = "Fetch a subscription by its key",
        skip(self, key),
        fields(
            user_id = %key.user_id,
            service_name = %key.service_name.as_ref(),
            start_date = %key.start_date
        )
    )]
    pub async fn get(&self, key: &SubscriptionKey) -> Result<Option<Subscription>, StorageError> {
        sqlx::query(
            r#"
            SELECT service_name, price, user_id, start_date, end_date
            FROM subscriptions
            WHERE user_id = $1 AND service_name = $2 AND start_date = $3
            "#,
        )
        .bind(key.user_id)
        .bind(key.service_name.as_ref())
        .bind(key.start_date.first_day())
        .try_map(subscription_from_row)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StorageError::Fetch(err)
        })
    }

    /// Replaces price and end date. Returns the number of rows affected, zero
    /// when no subscription matches the key.
    #[tracing::instrument(
        name = "Update a subscription",
        skip(self, key, update),
        fields(
            user_id = %key.user_id,
            service_name = %key.service_name.as_ref(),
            start_date = %key.start_date,
            price = update.price.value()
        )
    )]
    pub async fn update(
        &self,
        key: &SubscriptionKey,
        update: &SubscriptionUpdate,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET price = $1, end_date = $2
            WHERE user_id = $3 AND service_name = $4 AND start_date = $5
            "#,
        )
        .bind(update.price.value())
        .bind(update.end_date.map(|end_date| end_date.first_day()))
        .bind(key.user_id)
        .bind(key.service_name.as_ref())
        .bind(key.start_date.first_day())
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StorageError::Update(err)
        })?;

        Ok(result.rows_affected())
    }

    /// Returns the number of rows deleted, zero when no subscription matches.
    #[tracing::instrument(
        name = "Delete a subscription",
        skip(self, key),
        fields(
            user_id = %key.user_id,
            service_name = %key.service_name.as_ref(),
            start_date = %key.start_date
        )
    )]
    pub async fn delete(&self, key: &SubscriptionKey) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE user_id = $1 AND service_name = $2 AND start_date = $3
            "#,
        )
        .bind(key.user_id)
        .bind(key.service_name.as_ref())
        .bind(key.start_date.first_day())
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StorageError::Delete(err)
        })?;

        Ok(result.rows_affected())
    }

    /// Rows come back ordered by start date, service name and user id. That
    /// order is incidental and callers should not depend on it.
    #[tracing::instrument(name = "List subscriptions", skip(self))]
    pub async fn list(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, StorageError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_SUBSCRIPTIONS);

        push_identity_filters(&mut query, filter.user_id, filter.service_name.as_deref());

        if let Some(from_date) = filter.start_date_from {
            query
                .push(" AND start_date >= ")
                .push_bind(from_date.first_day());
        }
        if let Some(to_date) = filter.start_date_to {
            query.push(" AND start_date <= ").push_bind(to_date.first_day());
        }

        query.push(" ORDER BY start_date, service_name, user_id");

        let subscriptions = query
            .build()
            .try_map(subscription_from_row)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StorageError::Fetch(err)
            })?;

        tracing::info!("Found {} subscriptions", subscriptions.len());

        Ok(subscriptions)
    }

    /// Sum of `price` over subscriptions starting within the range. Zero when
    /// nothing matches.
    #[tracing::instrument(name = "Calculate the total price of subscriptions", skip(self))]
    pub async fn sum_price(&self, filter: &TotalPriceFilter) -> Result<i64, StorageError> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COALESCE(SUM(price), 0)::BIGINT AS total_price
            FROM subscriptions
            WHERE start_date BETWEEN "#,
        );

        query
            .push_bind(filter.from_date.first_day())
            .push(" AND ")
            .push_bind(filter.to_date.first_day());

        push_identity_filters(&mut query, filter.user_id, filter.service_name.as_deref());

        let row = query
            .build()
            .fetch_one(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StorageError::Aggregate(err)
            })?;

        row.try_get("total_price").map_err(StorageError::Aggregate)
    }
}

/// Exact match on user id, case-insensitive substring match on service name.
fn push_identity_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    user_id: Option<Uuid>,
    service_name: Option<&str>,
) {
    if let Some(user_id) = user_id {
        query.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(service_name) = service_name {
        query
            .push(" AND service_name ILIKE ")
            .push_bind(format!("%{}%", escape_like_pattern(service_name)));
    }
}

// `\` is the default LIKE escape character in Postgres
fn escape_like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn subscription_from_row(row: PgRow) -> Result<Subscription, sqlx::Error> {
    let service_name = ServiceName::parse(row.try_get("service_name")?)
        .map_err(|err| sqlx::Error::Decode(err.into()))?;
    let price = Price::parse(i64::from(row.try_get::<i32, _>("price")?))
        .map_err(|err| sqlx::Error::Decode(err.into()))?;
    let start_date: NaiveDate = row.try_get("start_date")?;
    let end_date: Option<NaiveDate> = row.try_get("end_date")?;

    Ok(Subscription {
        service_name,
        price,
        user_id: row.try_get("user_id")?,
        start_date: MonthYear::from(start_date),
        end_date: end_date.map(MonthYear::from),
    })
}
