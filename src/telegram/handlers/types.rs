//! Handler types and dependencies

use std::sync::Arc;

use super::request::RequestHandler;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub request_handler: Arc<RequestHandler>,
}

impl HandlerDeps {
    pub fn new(request_handler: Arc<RequestHandler>) -> Self {
        Self { request_handler }
    }
}
