pub mod router;
pub mod calculator;
pub mod command;

pub use router::{QueryParam, SimpleHandler, build_routes, form_value};
