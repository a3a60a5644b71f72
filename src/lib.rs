pub mod app;
pub mod campaign;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod participants;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;
pub mod view;

pub use app::router;
pub use campaign::CampaignWindow;
pub use state::AppState;
pub use store::{open_store, resolve_store_config};
