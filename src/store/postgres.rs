use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderId};
use super::{OrderPredicate, OrderQuery, OrderStore, ScanResult, StoreError, SwapOutcome};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// Optimistic concurrency is a single conditional UPDATE:
//
//   UPDATE orders SET ..., version = version + 1
//   WHERE id = $1 AND version = $2
//
// Zero affected rows means another writer won; Postgres row locking makes
// the check and the write atomic.
//
// ============================================================================

const ORDER_COLUMNS: &str = "id, version, customer_first_name, customer_last_name, \
     customer_phone, delivery_address, pilotes, total_price, created_at, updated_at";

const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    version BIGINT NOT NULL,
    customer_first_name TEXT NOT NULL,
    customer_last_name TEXT NOT NULL,
    customer_phone TEXT NOT NULL,
    delivery_address TEXT NOT NULL,
    pilotes INTEGER NOT NULL,
    total_price BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

type OrderRow = (
    Uuid,
    i64,
    String,
    String,
    String,
    String,
    i32,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn order_from_row(row: OrderRow) -> Order {
    let (
        id,
        version,
        customer_first_name,
        customer_last_name,
        customer_phone,
        delivery_address,
        pilotes,
        total_price,
        created_at,
        updated_at,
    ) = row;

    Order {
        id,
        version,
        customer_first_name,
        customer_last_name,
        customer_phone,
        delivery_address,
        pilotes,
        total_price,
        created_at,
        updated_at,
    }
}

pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the orders table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS orders_customer_phone_idx ON orders (customer_phone)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Append `WHERE ... AND ...` for the query's predicates.
fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, predicates: &[OrderPredicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            OrderPredicate::PhoneEquals(phone) => {
                builder.push("customer_phone = ").push_bind(phone.clone());
            }
            OrderPredicate::FirstNameContains(part) => {
                builder.push("customer_first_name ILIKE ").push_bind(like_pattern(part));
            }
            OrderPredicate::LastNameContains(part) => {
                builder.push("customer_last_name ILIKE ").push_bind(like_pattern(part));
            }
        }
    }
}

/// `%part%` with LIKE wildcards in `part` escaped (backslash is the default escape).
fn like_pattern(part: &str) -> String {
    let mut pattern = String::with_capacity(part.len() + 2);
    pattern.push('%');
    for c in part.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn count_query(predicates: &[OrderPredicate]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_predicates(&mut builder, predicates);
    builder
}

fn page_query(query: &OrderQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM orders", ORDER_COLUMNS));
    push_predicates(&mut builder, &query.predicates);
    builder
        .push(" ORDER BY id LIMIT ")
        .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));
    builder
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(order_from_row))
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders ({}) VALUES ($1, 1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {}",
            ORDER_COLUMNS, ORDER_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(order.customer_first_name)
        .bind(order.customer_last_name)
        .bind(order.customer_phone)
        .bind(order.delivery_address)
        .bind(order.pilotes)
        .bind(order.total_price)
        .bind(order.created_at)
        .fetch_one(&self.pool)
        .await?;

        let order = order_from_row(row);
        tracing::debug!(order_id = %order.id, "Inserted order into postgres");
        Ok(order)
    }

    async fn compare_and_swap(&self, order: &Order) -> Result<SwapOutcome, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET
                customer_first_name = $3,
                customer_last_name = $4,
                customer_phone = $5,
                delivery_address = $6,
                pilotes = $7,
                total_price = $8,
                updated_at = $9,
                version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(order.id)
        .bind(order.version)
        .bind(&order.customer_first_name)
        .bind(&order.customer_last_name)
        .bind(&order.customer_phone)
        .bind(&order.delivery_address)
        .bind(order.pilotes)
        .bind(order.total_price)
        .bind(order.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(SwapOutcome::Swapped(order_from_row(row))),
            None => {
                tracing::debug!(
                    order_id = %order.id,
                    expected_version = order.version,
                    "Conditional update matched no row"
                );
                Ok(SwapOutcome::VersionMismatch)
            }
        }
    }

    async fn scan(&self, query: &OrderQuery) -> Result<ScanResult, StoreError> {
        let total_count: i64 = count_query(&query.predicates)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<OrderRow> = page_query(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(ScanResult {
            orders: rows.into_iter().map(order_from_row).collect(),
            total_count: u64::try_from(total_count).unwrap_or(0),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Only SQL construction is covered here. Round trips against a live
// database need DATABASE_URL and are exercised by running the binary.
//
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_predicates_means_no_where_clause() {
        assert_eq!(count_query(&[]).sql(), "SELECT COUNT(*) FROM orders");
    }

    #[test]
    fn test_predicates_are_joined_with_and() {
        let builder = count_query(&[
            OrderPredicate::PhoneEquals("5551234567".to_string()),
            OrderPredicate::FirstNameContains("mik".to_string()),
            OrderPredicate::LastNameContains("waz".to_string()),
        ]);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM orders WHERE customer_phone = $1 \
             AND customer_first_name ILIKE $2 AND customer_last_name ILIKE $3"
        );
    }

    #[test]
    fn test_page_query_orders_by_id_and_windows() {
        let builder = page_query(&OrderQuery {
            predicates: vec![OrderPredicate::PhoneEquals("5551234567".to_string())],
            offset: 10,
            limit: 10,
        });

        assert!(builder.sql().ends_with("WHERE customer_phone = $1 ORDER BY id LIMIT $2 OFFSET $3"));
        assert!(!builder.sql().contains(" OR "));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("mik"), "%mik%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
