use clipforge_core::Config;
use clipforge_services::MediaService;

/// Shared application state, wrapped in `Arc` by the router.
pub struct AppState {
    pub config: Config,
    pub media: MediaService,
}
