pub mod chat_request;
pub mod chat_route;
pub mod upload_route;
