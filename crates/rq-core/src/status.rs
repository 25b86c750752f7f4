//! Outcome of a dispatched command

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code returned to the remote platform for a command
///
/// The numeric values follow the HTTP status codes the remote platform
/// uses for its integration API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
    Timeout,
    Conflict,
    ServerError,
    NotImplemented,
    ServiceUnavailable,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::Timeout => 408,
            StatusCode::Conflict => 409,
            StatusCode::ServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "BAD_REQUEST",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::Timeout => "TIMEOUT",
            StatusCode::Conflict => "CONFLICT",
            StatusCode::ServerError => "SERVER_ERROR",
            StatusCode::NotImplemented => "NOT_IMPLEMENTED",
            StatusCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        };
        write!(f, "{} ({})", name, self.code())
    }
}
