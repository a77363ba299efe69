//! Credential and session handling: registration, login, token refresh,
//! logout, and the per-request verifier middleware.

pub mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
