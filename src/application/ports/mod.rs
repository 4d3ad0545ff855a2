pub mod marca_gateway;
pub mod query_cache;

pub use marca_gateway::MarcaGateway;
pub use query_cache::QueryCache;
