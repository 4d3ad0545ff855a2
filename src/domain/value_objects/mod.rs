pub mod estado;
pub mod filter;
pub mod marca_id;
pub mod query_key;

pub use estado::Estado;
pub use filter::{MarcaFilter, PageRequest};
pub use marca_id::MarcaId;
pub use query_key::QueryKey;
