//! User listing behind the coarse role gate.

pub mod handlers;

pub use self::handlers::router;
