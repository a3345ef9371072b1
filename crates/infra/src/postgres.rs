//! Postgres-backed store.
//!
//! Runtime sqlx queries with manual row mapping. Predicates and sort specs
//! come from the query core already validated against the entity schemas, so
//! the column names interpolated below are always from a static allow-list;
//! every value still goes through a bind parameter.
//!
//! Expected tables:
//!
//! ```sql
//! CREATE TABLE categories (
//!     id          UUID PRIMARY KEY,
//!     name        TEXT NOT NULL UNIQUE,
//!     description TEXT,
//!     created_at  TIMESTAMPTZ NOT NULL,
//!     updated_at  TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE products (
//!     id             UUID PRIMARY KEY,
//!     category_id    UUID NOT NULL REFERENCES categories (id) ON DELETE RESTRICT,
//!     name           TEXT NOT NULL,
//!     description    TEXT,
//!     price_cents    BIGINT NOT NULL CHECK (price_cents >= 0),
//!     stock_quantity BIGINT NOT NULL CHECK (stock_quantity >= 0),
//!     status         TEXT NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL,
//!     updated_at     TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE orders (
//!     id         UUID PRIMARY KEY,
//!     product_id UUID NOT NULL REFERENCES products (id) ON DELETE RESTRICT,
//!     quantity   BIGINT NOT NULL CHECK (quantity >= 1),
//!     status     TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! ```

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};

use storefront_catalog::{
    Category, CategoryPatch, Order, OrderPatch, OrderStatus, Product, ProductPatch, ProductStatus,
};
use storefront_core::{CategoryId, DomainError, OrderId, ProductId};
use storefront_query::filter::{Predicate, PredicateOp};
use storefront_query::schema::FieldValue;
use storefront_query::sort::SortSpec;
use storefront_query::store::{EntityStore, StoreError};

use crate::error::{RepoError, RepoResult};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self::new(pool))
    }

    // ---- categories ----

    pub async fn insert_category(&self, category: Category) -> RepoResult<Category> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "category name already exists"))?;
        Ok(category)
    }

    pub async fn get_category(&self, id: CategoryId) -> RepoResult<Category> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable_repo)?
        .ok_or_else(RepoError::not_found)?;
        category_from_row(&row).map_err(unavailable_repo)
    }

    pub async fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> RepoResult<Category> {
        let mut updated = self.get_category(id).await?;
        updated.apply(patch)?;
        sqlx::query(
            "UPDATE categories SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "category name already exists"))?;
        Ok(updated)
    }

    pub async fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE category_id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(unavailable_repo)?;
        if in_use {
            return Err(RepoError::conflict(
                "category still has products; delete or reassign them first",
            ));
        }
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err(e, "category still has products"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found());
        }
        Ok(())
    }

    // ---- products ----

    pub async fn insert_product(&self, product: Product) -> RepoResult<Product> {
        self.require_category(product.category_id).await?;
        sqlx::query(
            r#"
            INSERT INTO products
                (id, category_id, name, description, price_cents, stock_quantity, status,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.category_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.status.as_str())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "product conflicts with an existing record"))?;
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> RepoResult<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, category_id, name, description, price_cents, stock_quantity, status,
                   created_at, updated_at
            FROM products WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable_repo)?
        .ok_or_else(RepoError::not_found)?;
        product_from_row(&row).map_err(unavailable_repo)
    }

    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> RepoResult<Product> {
        if let Some(category_id) = patch.category_id {
            self.require_category(category_id).await?;
        }
        let mut updated = self.get_product(id).await?;
        updated.apply(patch)?;
        sqlx::query(
            r#"
            UPDATE products
            SET category_id = $2, name = $3, description = $4, price_cents = $5,
                stock_quantity = $6, status = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(updated.category_id.as_uuid())
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(updated.price_cents)
        .bind(updated.stock_quantity)
        .bind(updated.status.as_str())
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "product conflicts with an existing record"))?;
        Ok(updated)
    }

    pub async fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE product_id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(unavailable_repo)?;
        if in_use {
            return Err(RepoError::conflict(
                "product still has orders; it cannot be deleted",
            ));
        }
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err(e, "product still has orders"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found());
        }
        Ok(())
    }

    // ---- orders ----

    pub async fn insert_order(&self, order: Order) -> RepoResult<Order> {
        let product_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(order.product_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(unavailable_repo)?;
        if !product_exists {
            return Err(DomainError::validation("product_id", "unknown product").into());
        }
        sqlx::query(
            r#"
            INSERT INTO orders (id, product_id, quantity, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.product_id.as_uuid())
        .bind(order.quantity)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "order conflicts with an existing record"))?;
        Ok(order)
    }

    pub async fn get_order(&self, id: OrderId) -> RepoResult<Order> {
        let row = sqlx::query(
            "SELECT id, product_id, quantity, status, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable_repo)?
        .ok_or_else(RepoError::not_found)?;
        order_from_row(&row).map_err(unavailable_repo)
    }

    pub async fn update_order(&self, id: OrderId, patch: OrderPatch) -> RepoResult<Order> {
        let mut updated = self.get_order(id).await?;
        updated.apply(patch)?;
        sqlx::query("UPDATE orders SET quantity = $2, status = $3, updated_at = $4 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(updated.quantity)
            .bind(updated.status.as_str())
            .bind(updated.updated_at)
            .execute(&self.pool)
            .await
            .map_err(unavailable_repo)?;
        Ok(updated)
    }

    pub async fn delete_order(&self, id: OrderId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(unavailable_repo)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found());
        }
        Ok(())
    }

    async fn require_category(&self, id: CategoryId) -> RepoResult<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(unavailable_repo)?;
        if !exists {
            return Err(DomainError::validation("category_id", "unknown category").into());
        }
        Ok(())
    }

    async fn count_rows(&self, table: &str, predicates: &[Predicate]) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {table} WHERE 1=1"));
        push_predicates(&mut qb, predicates);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable_store)?;
        Ok(count as u64)
    }

    async fn fetch_rows(
        &self,
        select: &str,
        predicates: &[Predicate],
        sort: &SortSpec,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PgRow>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(select);
        push_predicates(&mut qb, predicates);
        push_order_by(&mut qb, sort);
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);
        qb.push(" OFFSET ");
        qb.push_bind(offset as i64);
        qb.build()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable_store)
    }
}

impl EntityStore<Category> for PgStore {
    async fn count(&self, predicates: &[Predicate]) -> Result<u64, StoreError> {
        self.count_rows("categories", predicates).await
    }

    async fn fetch_page(
        &self,
        predicates: &[Predicate],
        sort: &SortSpec,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Category>, StoreError> {
        let rows = self
            .fetch_rows(
                "SELECT id, name, description, created_at, updated_at FROM categories WHERE 1=1",
                predicates,
                sort,
                offset,
                limit,
            )
            .await?;
        rows.iter()
            .map(category_from_row)
            .collect::<Result<_, _>>()
            .map_err(unavailable_store)
    }
}

impl EntityStore<Product> for PgStore {
    async fn count(&self, predicates: &[Predicate]) -> Result<u64, StoreError> {
        self.count_rows("products", predicates).await
    }

    async fn fetch_page(
        &self,
        predicates: &[Predicate],
        sort: &SortSpec,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .fetch_rows(
                "SELECT id, category_id, name, description, price_cents, stock_quantity, status, \
                 created_at, updated_at FROM products WHERE 1=1",
                predicates,
                sort,
                offset,
                limit,
            )
            .await?;
        rows.iter()
            .map(product_from_row)
            .collect::<Result<_, _>>()
            .map_err(unavailable_store)
    }
}

impl EntityStore<Order> for PgStore {
    async fn count(&self, predicates: &[Predicate]) -> Result<u64, StoreError> {
        self.count_rows("orders", predicates).await
    }

    async fn fetch_page(
        &self,
        predicates: &[Predicate],
        sort: &SortSpec,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Order>, StoreError> {
        let rows = self
            .fetch_rows(
                "SELECT id, product_id, quantity, status, created_at, updated_at \
                 FROM orders WHERE 1=1",
                predicates,
                sort,
                offset,
                limit,
            )
            .await?;
        rows.iter()
            .map(order_from_row)
            .collect::<Result<_, _>>()
            .map_err(unavailable_store)
    }
}

/// Schema field name → column name. Only `price` differs from its column.
fn column(field: &'static str) -> &'static str {
    match field {
        "price" => "price_cents",
        other => other,
    }
}

fn push_predicates(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    for p in predicates {
        qb.push(" AND ");
        qb.push(column(p.field));
        match p.op {
            PredicateOp::Eq => {
                qb.push(" = ");
                push_value(qb, &p.value);
            }
            PredicateOp::Gte => {
                qb.push(" >= ");
                push_value(qb, &p.value);
            }
            PredicateOp::Lte => {
                qb.push(" <= ");
                push_value(qb, &p.value);
            }
            PredicateOp::Contains => {
                qb.push(" ILIKE ");
                let pattern = match &p.value {
                    FieldValue::Text(t) => format!("%{}%", escape_like(t)),
                    _ => String::new(),
                };
                qb.push_bind(pattern);
            }
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Text(v) => qb.push_bind(v.clone()),
        FieldValue::Integer(v) => qb.push_bind(*v),
        FieldValue::Uuid(v) => qb.push_bind(*v),
        FieldValue::Timestamp(v) => qb.push_bind(*v),
    };
}

fn push_order_by(qb: &mut QueryBuilder<'_, Postgres>, sort: &SortSpec) {
    qb.push(" ORDER BY ");
    for (i, key) in sort.keys.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column(key.field));
        qb.push(match key.direction {
            storefront_query::schema::Direction::Asc => " ASC",
            storefront_query::schema::Direction::Desc => " DESC",
        });
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        category_id: CategoryId::from_uuid(row.try_get("category_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price_cents: row.try_get("price_cents")?,
        stock_quantity: row.try_get("stock_quantity")?,
        status: ProductStatus::parse(&status)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown product status `{status}`").into()))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: row.try_get("quantity")?,
        status: OrderStatus::parse(&status)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown order status `{status}`").into()))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_write_err(e: sqlx::Error, conflict_msg: &str) -> RepoError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() || db.is_foreign_key_violation() {
            return RepoError::conflict(conflict_msg);
        }
    }
    unavailable_repo(e)
}

fn unavailable_repo(e: sqlx::Error) -> RepoError {
    RepoError::Unavailable(e.to_string())
}

fn unavailable_store(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}
