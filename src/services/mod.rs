//! HTTP surface. Each sub-module owns one route group and exposes a
//! `configure_routes()` returning its Actix scope.

pub mod error;
pub mod ping;
pub mod submissions;
