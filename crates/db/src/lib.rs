pub mod errors;
pub mod models;
pub mod pg;
pub mod repositories;

pub use errors::DbError;
pub use models::*;
pub use repositories::*;
