use std::sync::Arc;

use crate::{
    app::AppState,
    http::{
        errors::ServerError,
        handler::{RequestHandlerStrategy, Dispatcher},
        request::HttpRequest,
        response::Response,
        router::{calculator, command},
    },
    utils::text::url_decode,
};

pub struct SimpleHandler<F>(pub F);

impl<F> RequestHandlerStrategy for SimpleHandler<F>
where
    F: Fn(&HttpRequest) -> Result<Response, ServerError> + Send + Sync + 'static,
{
    fn handle(&self, req: &HttpRequest) -> Result<Response, ServerError> {
        (self.0)(req)
    }
}

pub fn build_routes(state: Arc<AppState>) -> Dispatcher {
    let mut builder = Dispatcher::builder();

    builder = calculator::register(builder, state.clone());
    builder = command::register(builder, state);

    builder.build()
}

pub trait QueryParam {
    /// First value for `key`, form-decoded.
    fn query_param(&self, key: &str) -> Option<String>;
}

impl QueryParam for HttpRequest {
    fn query_param(&self, key: &str) -> Option<String> {
        form_value(&self.query, key)
    }
}

/// Looks up `key` in an `a=1&b=2` encoded string (query or form body).
pub fn form_value(encoded: &str, key: &str) -> Option<String> {
    if encoded.is_empty() {
        return None;
    }
    for pair in encoded.split('&') {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if url_decode(k) == key {
            return Some(url_decode(v));
        }
    }
    None
}
