pub mod marca_service;
pub mod pager;

#[cfg(test)]
pub(crate) mod test_support;

pub use marca_service::MarcaService;
pub use pager::MarcaPager;
