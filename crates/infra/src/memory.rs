//! In-memory store for development and tests.
//!
//! One `RwLock`-guarded table per entity. Each query primitive takes the
//! lock exactly once, so count and fetch each see a consistent snapshot.
//! Predicate evaluation and ordering are delegated to the query core's
//! `Predicate::matches` / `SortSpec::compare`, so this store filters and
//! sorts identically to any other backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use storefront_catalog::{
    Category, CategoryPatch, Order, OrderPatch, Product, ProductPatch,
};
use storefront_core::{CategoryId, DomainError, OrderId, ProductId};
use storefront_query::filter::Predicate;
use storefront_query::schema::Queryable;
use storefront_query::sort::SortSpec;
use storefront_query::store::{EntityStore, StoreError};

use crate::error::{RepoError, RepoResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    categories: RwLock<BTreeMap<CategoryId, Category>>,
    products: RwLock<BTreeMap<ProductId, Product>>,
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- categories ----

    pub fn insert_category(&self, category: Category) -> RepoResult<Category> {
        let mut categories = self.categories.write().unwrap();
        if categories.values().any(|c| c.name == category.name) {
            return Err(RepoError::conflict(format!(
                "category name `{}` already exists",
                category.name
            )));
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Category> {
        self.categories
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(RepoError::not_found)
    }

    pub fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> RepoResult<Category> {
        let mut categories = self.categories.write().unwrap();
        let mut updated = categories.get(&id).cloned().ok_or_else(RepoError::not_found)?;
        updated.apply(patch)?;
        if categories
            .values()
            .any(|c| c.id != id && c.name == updated.name)
        {
            return Err(RepoError::conflict(format!(
                "category name `{}` already exists",
                updated.name
            )));
        }
        categories.insert(id, updated.clone());
        Ok(updated)
    }

    pub fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let mut categories = self.categories.write().unwrap();
        if !categories.contains_key(&id) {
            return Err(RepoError::not_found());
        }
        let in_use = self
            .products
            .read()
            .unwrap()
            .values()
            .any(|p| p.category_id == id);
        if in_use {
            return Err(RepoError::conflict(
                "category still has products; delete or reassign them first",
            ));
        }
        categories.remove(&id);
        Ok(())
    }

    // ---- products ----

    pub fn insert_product(&self, product: Product) -> RepoResult<Product> {
        // Hold the categories lock across the insert so a concurrent
        // delete_category cannot slip between the check and the write.
        // Lock order is categories then products, same as delete_category.
        let categories = self.categories.read().unwrap();
        if !categories.contains_key(&product.category_id) {
            return Err(DomainError::validation("category_id", "unknown category").into());
        }
        self.products
            .write()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(product)
    }

    pub fn get_product(&self, id: ProductId) -> RepoResult<Product> {
        self.products
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(RepoError::not_found)
    }

    pub fn update_product(&self, id: ProductId, patch: ProductPatch) -> RepoResult<Product> {
        // Held across the write; see insert_product.
        let categories = self.categories.read().unwrap();
        if let Some(category_id) = patch.category_id {
            if !categories.contains_key(&category_id) {
                return Err(DomainError::validation("category_id", "unknown category").into());
            }
        }
        let mut products = self.products.write().unwrap();
        let mut updated = products.get(&id).cloned().ok_or_else(RepoError::not_found)?;
        updated.apply(patch)?;
        products.insert(id, updated.clone());
        Ok(updated)
    }

    pub fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        let mut products = self.products.write().unwrap();
        if !products.contains_key(&id) {
            return Err(RepoError::not_found());
        }
        let in_use = self
            .orders
            .read()
            .unwrap()
            .values()
            .any(|o| o.product_id == id);
        if in_use {
            return Err(RepoError::conflict(
                "product still has orders; it cannot be deleted",
            ));
        }
        products.remove(&id);
        Ok(())
    }

    // ---- orders ----

    pub fn insert_order(&self, order: Order) -> RepoResult<Order> {
        // Hold the products lock across the insert; lock order is products
        // then orders, same as delete_product.
        let products = self.products.read().unwrap();
        if !products.contains_key(&order.product_id) {
            return Err(DomainError::validation("product_id", "unknown product").into());
        }
        self.orders.write().unwrap().insert(order.id, order.clone());
        Ok(order)
    }

    pub fn get_order(&self, id: OrderId) -> RepoResult<Order> {
        self.orders
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(RepoError::not_found)
    }

    pub fn update_order(&self, id: OrderId, patch: OrderPatch) -> RepoResult<Order> {
        let mut orders = self.orders.write().unwrap();
        let mut updated = orders.get(&id).cloned().ok_or_else(RepoError::not_found)?;
        updated.apply(patch)?;
        orders.insert(id, updated.clone());
        Ok(updated)
    }

    pub fn delete_order(&self, id: OrderId) -> RepoResult<()> {
        self.orders
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(RepoError::not_found)
    }
}

fn query_page<K: Ord, T: Queryable + Clone>(
    table: &RwLock<BTreeMap<K, T>>,
    predicates: &[Predicate],
    sort: &SortSpec,
    offset: u64,
    limit: u64,
) -> Vec<T> {
    let mut rows: Vec<T> = table
        .read()
        .unwrap()
        .values()
        .filter(|row| predicates.iter().all(|p| p.matches(*row)))
        .cloned()
        .collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows.into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

fn query_count<K: Ord, T: Queryable>(
    table: &RwLock<BTreeMap<K, T>>,
    predicates: &[Predicate],
) -> u64 {
    table
        .read()
        .unwrap()
        .values()
        .filter(|row| predicates.iter().all(|p| p.matches(*row)))
        .count() as u64
}

macro_rules! impl_entity_store {
    ($entity:ty, $table:ident) => {
        impl EntityStore<$entity> for MemoryStore {
            async fn count(&self, predicates: &[Predicate]) -> Result<u64, StoreError> {
                Ok(query_count(&self.$table, predicates))
            }

            async fn fetch_page(
                &self,
                predicates: &[Predicate],
                sort: &SortSpec,
                offset: u64,
                limit: u64,
            ) -> Result<Vec<$entity>, StoreError> {
                Ok(query_page(&self.$table, predicates, sort, offset, limit))
            }
        }
    };
}

impl_entity_store!(Category, categories);
impl_entity_store!(Product, products);
impl_entity_store!(Order, orders);
