pub mod request;
pub mod response;
pub mod handler;
pub mod errors;
pub mod server;
pub mod page;
pub mod router;
