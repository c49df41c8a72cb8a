pub mod errors;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_app;
pub use state::AppState;
