use std::sync::Arc;

use crate::app::AppState;
use crate::http::{
    handler::{RequestHandlerStrategy, DispatcherBuilder},
    request::HttpRequest,
    response::{Response, OK},
    errors::ServerError,
    router::router::SimpleHandler,
};
use crate::utils::{cpu::format::showcase, text};


/// /stats  (read-only; never counts as a visit)
pub struct StatsHandler {
    pub state: Arc<AppState>,
}

impl RequestHandlerStrategy for StatsHandler {
    fn handle(&self, _req: &HttpRequest) -> Result<Response, ServerError> {
        Ok(Response::json(OK, &self.state.stats.query()))
    }
}

// /examples
fn examples_handler(_req: &HttpRequest) -> Result<Response, ServerError> {
    Ok(Response::json(OK, &showcase()))
}

// /help
fn help_handler(_req: &HttpRequest) -> Result<Response, ServerError> {
    Ok(Response::new(OK).with_body(text::help()))
}

pub fn register(builder: DispatcherBuilder, state: Arc<AppState>) -> DispatcherBuilder {
    builder
        .get("/stats", Arc::new(StatsHandler { state }))
        .get("/examples", Arc::new(SimpleHandler(examples_handler)))
        .get("/help", Arc::new(SimpleHandler(help_handler)))
}
