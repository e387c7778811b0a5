use crate::app_state::AppState;
use crate::page_manager::Page;
use std::sync::Arc;

/// Trait that defines a factory for creating a specific page (e.g., Users, Login).
pub trait PageFactory {
    /// Route name this factory serves. Must match `Route::name`.
    fn route_name(&self) -> &'static str;

    /// Builds the page instance. Called lazily, the first time the route is
    /// entered; the instance is then reused for later visits.
    /// This is where the page takes its bus controller and shared state.
    fn create(&self, state: &Arc<AppState>) -> Box<dyn Page>;
}
