use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod errors;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod password;
pub mod repo;
pub mod service;
pub mod store;
pub mod token;
pub mod validate;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
