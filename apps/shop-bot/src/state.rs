use std::sync::Arc;

use crate::bot::navigation::Navigator;
use crate::services::customer_service::CustomerService;

#[derive(Clone)]
pub struct AppState {
    pub navigator: Arc<Navigator>,
    pub customer_service: CustomerService,
    pub default_language: String,
}
