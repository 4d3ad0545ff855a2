pub mod cache;
pub mod dashboard;
pub mod marca;

pub use cache::{CacheRead, CacheStatusSnapshot, CachedEntry, CachedValue, MutationSnapshot, PaginaSet};
pub use dashboard::{ActividadReciente, MarcasDetalles};
pub use marca::{Marca, MarcaDraft, MarcaPatch};
