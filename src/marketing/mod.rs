pub mod error;
pub mod handlers;
pub mod models;
pub mod recovery;
pub mod repository;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use recovery::*;
pub use repository::*;
