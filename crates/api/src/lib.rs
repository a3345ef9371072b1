//! `storefront-api` — HTTP surface over the catalog and its query core.

pub mod app;
