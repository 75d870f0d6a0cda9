use std::fmt::{self, Display, Formatter};
use std::io;

use crate::http::response::{
    Status,
    BAD_REQUEST, NOT_FOUND,
    TOO_MANY_REQUESTS, INTERNAL_SERVER_ERROR, SERVICE_UNAVAILABLE,
};

#[derive(Debug)]
pub enum ServerError {
    BadRequest(String),
    NotFound,
    TooManyRequests,
    Internal(String),
    ServiceUnavailable,
    Io(io::Error),
}

impl ServerError {
    pub fn status(&self) -> Status {
        match self {
            ServerError::BadRequest(_) => BAD_REQUEST,
            ServerError::NotFound => NOT_FOUND,
            ServerError::TooManyRequests => TOO_MANY_REQUESTS,
            ServerError::ServiceUnavailable => SERVICE_UNAVAILABLE,
            ServerError::Internal(_) | ServerError::Io(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::BadRequest(msg) => write!(f, "BadRequest: {}", msg),
            ServerError::NotFound => write!(f, "NotFound"),
            ServerError::TooManyRequests => write!(f, "TooManyRequests"),
            ServerError::Internal(msg) => write!(f, "Internal: {}", msg),
            ServerError::ServiceUnavailable => write!(f, "ServiceUnavailable"),
            ServerError::Io(e) => write!(f, "IO: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<io::Error> for ServerError {
    fn from(value: io::Error) -> Self { ServerError::Io(value) }
}
