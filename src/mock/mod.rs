//! In-memory stand-in for the DataMantri backend, used for demo and offline sessions.

pub mod collection;
pub mod entities;
pub mod runs;
pub mod seed;
pub mod service;
pub mod store;

pub use collection::Collection;
pub use entities::*;
pub use service::{MockService, ResourceApi, Resources};
pub use store::{MockStore, Stored};
