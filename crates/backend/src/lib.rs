#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
