//! Store-backend dispatch for the HTTP layer.

use std::sync::Arc;

use storefront_catalog::{
    CATEGORY_SCHEMA, Category, CategoryPatch, ORDER_SCHEMA, Order, OrderPatch, PRODUCT_SCHEMA,
    Product, ProductPatch,
};
use storefront_core::{CategoryId, OrderId, ProductId};
use storefront_infra::{MemoryStore, RepoResult};
use storefront_query::orchestrator::{ListParams, run_list};
use storefront_query::{PageEnvelope, QueryError};

#[cfg(feature = "postgres")]
use storefront_infra::PgStore;

/// The configured store backend.
///
/// Every handler goes through these methods, so backends stay interchangeable
/// and the handlers never see a concrete store type.
#[derive(Clone)]
pub enum AppServices {
    InMemory { store: Arc<MemoryStore> },
    #[cfg(feature = "postgres")]
    Postgres { store: Arc<PgStore> },
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self::InMemory {
            store: Arc::new(MemoryStore::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(store: PgStore) -> Self {
        Self::Postgres {
            store: Arc::new(store),
        }
    }

    // ---- categories ----

    pub async fn list_categories(
        &self,
        params: &ListParams,
    ) -> Result<PageEnvelope<Category>, QueryError> {
        match self {
            AppServices::InMemory { store } => {
                run_list(store.as_ref(), &CATEGORY_SCHEMA, params).await
            }
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => {
                run_list(store.as_ref(), &CATEGORY_SCHEMA, params).await
            }
        }
    }

    pub async fn create_category(&self, category: Category) -> RepoResult<Category> {
        match self {
            AppServices::InMemory { store } => store.insert_category(category),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.insert_category(category).await,
        }
    }

    pub async fn get_category(&self, id: CategoryId) -> RepoResult<Category> {
        match self {
            AppServices::InMemory { store } => store.get_category(id),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.get_category(id).await,
        }
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> RepoResult<Category> {
        match self {
            AppServices::InMemory { store } => store.update_category(id, patch),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.update_category(id, patch).await,
        }
    }

    pub async fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        match self {
            AppServices::InMemory { store } => store.delete_category(id),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.delete_category(id).await,
        }
    }

    // ---- products ----

    pub async fn list_products(
        &self,
        params: &ListParams,
    ) -> Result<PageEnvelope<Product>, QueryError> {
        match self {
            AppServices::InMemory { store } => {
                run_list(store.as_ref(), &PRODUCT_SCHEMA, params).await
            }
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => {
                run_list(store.as_ref(), &PRODUCT_SCHEMA, params).await
            }
        }
    }

    pub async fn create_product(&self, product: Product) -> RepoResult<Product> {
        match self {
            AppServices::InMemory { store } => store.insert_product(product),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.insert_product(product).await,
        }
    }

    pub async fn get_product(&self, id: ProductId) -> RepoResult<Product> {
        match self {
            AppServices::InMemory { store } => store.get_product(id),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.get_product(id).await,
        }
    }

    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> RepoResult<Product> {
        match self {
            AppServices::InMemory { store } => store.update_product(id, patch),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.update_product(id, patch).await,
        }
    }

    pub async fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        match self {
            AppServices::InMemory { store } => store.delete_product(id),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.delete_product(id).await,
        }
    }

    // ---- orders ----

    pub async fn list_orders(
        &self,
        params: &ListParams,
    ) -> Result<PageEnvelope<Order>, QueryError> {
        match self {
            AppServices::InMemory { store } => run_list(store.as_ref(), &ORDER_SCHEMA, params).await,
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => run_list(store.as_ref(), &ORDER_SCHEMA, params).await,
        }
    }

    pub async fn create_order(&self, order: Order) -> RepoResult<Order> {
        match self {
            AppServices::InMemory { store } => store.insert_order(order),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.insert_order(order).await,
        }
    }

    pub async fn get_order(&self, id: OrderId) -> RepoResult<Order> {
        match self {
            AppServices::InMemory { store } => store.get_order(id),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.get_order(id).await,
        }
    }

    pub async fn update_order(&self, id: OrderId, patch: OrderPatch) -> RepoResult<Order> {
        match self {
            AppServices::InMemory { store } => store.update_order(id, patch),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.update_order(id, patch).await,
        }
    }

    pub async fn delete_order(&self, id: OrderId) -> RepoResult<()> {
        match self {
            AppServices::InMemory { store } => store.delete_order(id),
            #[cfg(feature = "postgres")]
            AppServices::Postgres { store } => store.delete_order(id).await,
        }
    }
}
