// モジュール定義
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{MarcaGateway, QueryCache};
pub use application::services::{MarcaPager, MarcaService};
pub use domain::entities::{ActividadReciente, Marca, MarcaDraft, MarcaPatch, MarcasDetalles};
pub use domain::value_objects::{Estado, MarcaFilter, MarcaId, PageRequest, QueryKey};
pub use infrastructure::api::RestMarcaGateway;
pub use infrastructure::cache::QueryStore;
pub use shared::{AppError, ClientConfig, Debouncer, Result};

use std::sync::Arc;
use std::time::Duration;

/// 設定からゲートウェイ・キャッシュ・サービス一式を組み立てる
pub fn build_service(config: &ClientConfig) -> Result<MarcaService> {
    config.validate().map_err(AppError::ConfigurationError)?;
    let gateway = Arc::new(RestMarcaGateway::new(&config.api)?);
    let store = Arc::new(QueryStore::new(Duration::from_secs(
        config.cache.stale_after_secs,
    )));
    Ok(MarcaService::new(gateway, store, &config.cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_service_with_default_config() {
        assert!(build_service(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_build_service_rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.cache.page_size = 0;
        assert!(matches!(
            build_service(&config),
            Err(AppError::ConfigurationError(_))
        ));
    }
}
