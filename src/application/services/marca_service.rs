use super::pager::MarcaPager;
use crate::application::ports::{MarcaGateway, QueryCache};
use crate::domain::entities::cache::{CacheRead, CacheStatusSnapshot, CachedValue};
use crate::domain::entities::{Marca, MarcaDraft, MarcaPatch, MarcasDetalles};
use crate::domain::value_objects::{MarcaFilter, MarcaId, PageRequest, QueryKey};
use crate::shared::config::CacheConfig;
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// マーカのキャッシュ同期サービス。
///
/// 読み取りはキャッシュ優先で、鮮度切れの値は返しつつ裏で再取得する。
/// ミューテーションはスナップショット取得・楽観反映・確定または巻き戻しの
/// 3段階で行い、同一IDへのミューテーションは直列化する。
pub struct MarcaService {
    gateway: Arc<dyn MarcaGateway>,
    cache: Arc<dyn QueryCache>,
    page_size: u32,
    mutation_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl MarcaService {
    pub fn new(
        gateway: Arc<dyn MarcaGateway>,
        cache: Arc<dyn QueryCache>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            gateway,
            cache,
            page_size: config.page_size,
            mutation_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn list(&self, filter: &MarcaFilter) -> Result<Vec<Marca>, AppError> {
        let key = QueryKey::lista(filter.clone());
        match self.cache.read(&key).await {
            CacheRead::Fresh(CachedValue::Lista(items)) => Ok(items),
            CacheRead::Stale(CachedValue::Lista(items)) => {
                debug!(%key, "serving stale lista, scheduling refresh");
                self.spawn_refresh(key);
                Ok(items)
            }
            _ => {
                let epoch = self.cache.begin_fetch(&key).await;
                let items = self
                    .gateway
                    .list(filter, &PageRequest::first(self.page_size))
                    .await?;
                self.cache
                    .complete_fetch(&key, epoch, CachedValue::Lista(items.clone()))
                    .await;
                Ok(items)
            }
        }
    }

    pub async fn detail(&self, id: MarcaId) -> Result<Marca, AppError> {
        // 作成フォームなどIDが未確定の間は無効なクエリとして扱う
        if !id.is_persisted() {
            return Err(AppError::InvalidInput(format!(
                "detail query requires a persisted id, got {}",
                id
            )));
        }
        let key = QueryKey::detalle(id);
        match self.cache.read(&key).await {
            CacheRead::Fresh(CachedValue::Detalle(marca)) => Ok(marca),
            CacheRead::Stale(CachedValue::Detalle(marca)) => {
                debug!(%key, "serving stale detalle, scheduling refresh");
                self.spawn_refresh(key);
                Ok(marca)
            }
            _ => {
                let epoch = self.cache.begin_fetch(&key).await;
                let marca = self.gateway.detail(id).await?;
                self.cache
                    .complete_fetch(&key, epoch, CachedValue::Detalle(marca.clone()))
                    .await;
                Ok(marca)
            }
        }
    }

    pub async fn detalles(&self) -> Result<MarcasDetalles, AppError> {
        let key = QueryKey::Detalles;
        match self.cache.read(&key).await {
            CacheRead::Fresh(CachedValue::Detalles(detalles)) => Ok(detalles),
            CacheRead::Stale(CachedValue::Detalles(detalles)) => {
                debug!(%key, "serving stale detalles, scheduling refresh");
                self.spawn_refresh(key);
                Ok(detalles)
            }
            _ => {
                let epoch = self.cache.begin_fetch(&key).await;
                let detalles = self.gateway.detalles().await?;
                self.cache
                    .complete_fetch(&key, epoch, CachedValue::Detalles(detalles.clone()))
                    .await;
                Ok(detalles)
            }
        }
    }

    pub async fn create(&self, draft: MarcaDraft) -> Result<Marca, AppError> {
        let mutation_id = Uuid::new_v4();
        let provisional_id = self.cache.next_provisional_id().await;
        let provisional = Marca::provisional(provisional_id, &draft);
        let snapshot = self.cache.optimistic_insert(&provisional).await;
        debug!(%mutation_id, provisional = %provisional_id, "optimistic insert applied");

        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        // 呼び出し側が途中で破棄されても照合・巻き戻しまで完走させる
        let task = tokio::spawn(async move {
            match gateway.create(&draft).await {
                Ok(confirmed) => {
                    // サーバ確定値との突き合わせは仮IDで行う。同名のレコードが
                    // 同時に作成されても取り違えない
                    cache.confirm_create(provisional_id, &confirmed).await;
                    cache.invalidate_listas().await;
                    info!(%mutation_id, id = %confirmed.id, "marca created");
                    Ok(confirmed)
                }
                Err(err) => {
                    cache.restore(snapshot).await;
                    cache.invalidate_listas().await;
                    warn!(%mutation_id, error = %err, "create failed, optimistic insert rolled back");
                    Err(err)
                }
            }
        });
        task.await
            .map_err(|err| AppError::Internal(format!("create task aborted: {}", err)))?
    }

    pub async fn update(&self, id: MarcaId, patch: MarcaPatch) -> Result<Marca, AppError> {
        if !id.is_persisted() {
            return Err(AppError::InvalidInput(format!(
                "update requires a persisted id, got {}",
                id
            )));
        }
        if patch.is_empty() {
            return Err(AppError::InvalidInput(
                "patch must contain at least one field".to_string(),
            ));
        }
        patch.validate().map_err(AppError::ValidationError)?;

        let mutation_id = Uuid::new_v4();
        let guard = self.mutation_lock(id).await;
        let snapshot = self.cache.optimistic_update(id, &patch).await;
        debug!(%mutation_id, %id, "optimistic update applied");

        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        // 呼び出し側が途中で破棄されても照合・巻き戻しまで完走させる
        let task = tokio::spawn(async move {
            let _guard = guard;
            match gateway.update(id, &patch).await {
                Ok(confirmed) => {
                    cache.confirm_update(&confirmed).await;
                    settle_update(cache.as_ref(), id).await;
                    info!(%mutation_id, %id, "marca updated");
                    Ok(confirmed)
                }
                Err(err) => {
                    cache.restore(snapshot).await;
                    settle_update(cache.as_ref(), id).await;
                    warn!(%mutation_id, %id, error = %err, "update failed, rolled back");
                    Err(err)
                }
            }
        });
        task.await
            .map_err(|err| AppError::Internal(format!("update task aborted: {}", err)))?
    }

    pub async fn delete(&self, id: MarcaId) -> Result<(), AppError> {
        if !id.is_persisted() {
            return Err(AppError::InvalidInput(format!(
                "delete requires a persisted id, got {}",
                id
            )));
        }

        let mutation_id = Uuid::new_v4();
        let guard = self.mutation_lock(id).await;
        let snapshot = self.cache.optimistic_remove(id).await;
        debug!(%mutation_id, %id, "optimistic remove applied");

        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        // 呼び出し側が途中で破棄されても照合・巻き戻しまで完走させる
        let task = tokio::spawn(async move {
            let _guard = guard;
            match gateway.delete(id).await {
                Ok(()) => {
                    cache.confirm_delete(id).await;
                    cache.invalidate_listas().await;
                    info!(%mutation_id, %id, "marca deleted");
                    Ok(())
                }
                Err(err) => {
                    cache.restore(snapshot).await;
                    cache.invalidate_listas().await;
                    warn!(%mutation_id, %id, error = %err, "delete failed, rolled back");
                    Err(err)
                }
            }
        });
        task.await
            .map_err(|err| AppError::Internal(format!("delete task aborted: {}", err)))?
    }

    /// 指定条件の無限スクロール用ページャを作る
    pub fn pager(&self, filter: MarcaFilter) -> MarcaPager {
        MarcaPager::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.cache),
            filter,
            self.page_size,
        )
    }

    pub async fn invalidate_listas(&self) {
        self.cache.invalidate_listas().await;
    }

    pub async fn cache_status(&self) -> CacheStatusSnapshot {
        self.cache.status().await
    }

    async fn mutation_lock(&self, id: MarcaId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.mutation_locks.lock().await;
            locks
                .entry(id.value())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// 鮮度切れエントリの再取得をバックグラウンドで行う。
    /// 失敗してもキャッシュは触らず、呼び出し側へは伝播しない
    fn spawn_refresh(&self, key: QueryKey) {
        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        let page = PageRequest::first(self.page_size);
        tokio::spawn(async move {
            let epoch = cache.begin_fetch(&key).await;
            let fetched = match &key {
                QueryKey::Lista(filter) => gateway.list(filter, &page).await.map(CachedValue::Lista),
                QueryKey::Detalle(id) => gateway.detail(*id).await.map(CachedValue::Detalle),
                QueryKey::Detalles => gateway.detalles().await.map(CachedValue::Detalles),
                // ページ列はページャが自前で再取得する
                QueryKey::Paginada(_) => return,
            };
            match fetched {
                Ok(value) => {
                    if !cache.complete_fetch(&key, epoch, value).await {
                        debug!(%key, "background refresh superseded");
                    }
                }
                Err(err) => {
                    warn!(%key, error = %err, "background refresh failed");
                }
            }
        });
    }
}

async fn settle_update(cache: &dyn QueryCache, id: MarcaId) {
    cache.invalidate_listas().await;
    cache.invalidate(&QueryKey::detalle(id)).await;
}
