//! Role administration: the permission-gated CRUD surface over the
//! role/permission store.

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use self::handlers::router;
