pub mod gateway;
pub mod memory_gateway;
pub mod model;
pub mod postgres_gateway;
pub mod validator;

pub use gateway::StorageGateway;
pub use memory_gateway::MemoryGateway;
pub use model::{OperationError, RemoteErrorKind, RemoteHandle, ResourceKind};
pub use postgres_gateway::PostgresGateway;
pub use validator::NameValidator;
