//! devobs core library: typed dev-observer API client, keyed client-side
//! store, URL validation and observation-key normalization.
//!
//! Build an [`api::ApiClient`] from a [`config::DevObsConfig`], wrap it in an
//! `Arc`, and hand it to [`store::AppStore::new`].

pub mod api;
pub mod config;
pub mod error;
pub mod normalize;
pub mod progress;
pub mod store;
pub mod types;
pub mod validate;
