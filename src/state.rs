use crate::store::DashboardStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DashboardStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DashboardStore>) -> Self {
        Self { store }
    }
}
