pub mod context_route;
