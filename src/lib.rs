pub mod backup;
pub mod errors;
pub mod http;
pub mod models;
pub mod persistence;
pub mod query;
pub mod store;
pub mod validate;

pub use errors::{AppError, AppResult};
pub use models::{ListFilters, StoreConfig, Todo, TodoDocument, TodoPayload, TodoStats};
pub use store::TodoStore;
