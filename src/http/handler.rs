use std::collections::HashMap;
use std::sync::Arc;

use crate::http::errors::ServerError;
use super::request::{HttpMethod, HttpRequest};
use super::response::Response;

pub trait RequestHandlerStrategy: Send + Sync + 'static {
    fn handle(&self, req: &HttpRequest) -> Result<Response, ServerError>;
}

/// Routes on exact path; anything unregistered is 404.
struct MapHandler {
    map: HashMap<String, Arc<dyn RequestHandlerStrategy>>,
}

impl RequestHandlerStrategy for MapHandler {
    fn handle(&self, req: &HttpRequest) -> Result<Response, ServerError> {
        if let Some(h) = self.map.get(&req.path) { h.handle(req) } else { Err(ServerError::NotFound) }
    }
}

pub struct Dispatcher {
    get: Arc<dyn RequestHandlerStrategy>,
    head: Arc<dyn RequestHandlerStrategy>,
    post: Arc<dyn RequestHandlerStrategy>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder { DispatcherBuilder::default() }

    pub fn dispatch(&self, req: &HttpRequest) -> Result<Response, ServerError> {
        match req.method {
            HttpMethod::GET => self.get.handle(req),
            HttpMethod::HEAD => self.head.handle(req),
            HttpMethod::POST => self.post.handle(req),
            HttpMethod::Unsupported(ref m) => Err(ServerError::BadRequest(format!("Unsupported method: {}", m))),
        }
    }
}

#[derive(Default)]
pub struct DispatcherBuilder {
    get_map: HashMap<String, Arc<dyn RequestHandlerStrategy>>,
    head_map: HashMap<String, Arc<dyn RequestHandlerStrategy>>,
    post_map: HashMap<String, Arc<dyn RequestHandlerStrategy>>,
}

impl DispatcherBuilder {
    pub fn get(mut self, path: &str, handler: Arc<dyn RequestHandlerStrategy>) -> Self { self.get_map.insert(path.to_string(), handler); self }
    pub fn head(mut self, path: &str, handler: Arc<dyn RequestHandlerStrategy>) -> Self { self.head_map.insert(path.to_string(), handler); self }
    pub fn post(mut self, path: &str, handler: Arc<dyn RequestHandlerStrategy>) -> Self { self.post_map.insert(path.to_string(), handler); self }

    /// HEAD falls back to the GET route of the same path; the server drops
    /// the body when writing.
    pub fn build(self) -> Dispatcher {
        let mut head_map = self.get_map.clone();
        head_map.extend(self.head_map);

        Dispatcher {
            get: Arc::new(MapHandler { map: self.get_map }),
            head: Arc::new(MapHandler { map: head_map }),
            post: Arc::new(MapHandler { map: self.post_map }),
        }
    }
}
