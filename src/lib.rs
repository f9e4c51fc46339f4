pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use error::CampusError;
pub use router::{CampusOptions, CampusState, campus_router};
