pub mod gateway;
pub mod http;

pub use gateway::BackendGateway;
pub use http::BackendClient;
