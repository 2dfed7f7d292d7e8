//! axum server exposing the loaded registry.
//!
//! ```text
//! request ─▶ handlers ─▶ block list snapshot ─▶ HospitalCatalog ─▶ JSON / HTML
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod page;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
