//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod adding_tasks;
pub mod error;
pub mod health;
pub mod movies;
pub mod rejections;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
