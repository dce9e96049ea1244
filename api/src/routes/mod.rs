pub mod chat;
pub mod context;
pub mod health_route;
