use crate::application::ports::{MarcaGateway, QueryCache};
use crate::domain::entities::cache::{CacheRead, CachedValue};
use crate::domain::entities::Marca;
use crate::domain::value_objects::{MarcaFilter, PageRequest, QueryKey};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::debug;

/// オフセットカーソルで一覧を少しずつ取得するページャ。
///
/// 取得件数がページサイズちょうどなら続きがあるとみなし、
/// 不足したページを受け取った時点で終端とする。以降の
/// `next_page` はリクエストを発行しない。
pub struct MarcaPager {
    gateway: Arc<dyn MarcaGateway>,
    cache: Arc<dyn QueryCache>,
    filter: MarcaFilter,
    limit: u32,
}

impl MarcaPager {
    pub fn new(
        gateway: Arc<dyn MarcaGateway>,
        cache: Arc<dyn QueryCache>,
        filter: MarcaFilter,
        limit: u32,
    ) -> Self {
        Self {
            gateway,
            cache,
            filter,
            limit,
        }
    }

    fn key(&self) -> QueryKey {
        QueryKey::paginada(self.filter.clone())
    }

    /// 次のページを取得する。終端到達済みなら `None`
    pub async fn next_page(&self) -> Result<Option<Vec<Marca>>, AppError> {
        let key = self.key();
        let (offset, end_reached) = self.cache.pagina_state(&key).await;
        if end_reached {
            return Ok(None);
        }

        let epoch = self.cache.begin_fetch(&key).await;
        let page = self
            .gateway
            .list(&self.filter, &PageRequest::new(self.limit, offset))
            .await?;
        if !self
            .cache
            .append_pagina(&key, epoch, page.clone(), self.limit)
            .await
        {
            debug!(%key, "fetched page superseded, not cached");
        }
        Ok(Some(page))
    }

    /// これまでに取得したページを取得順に連結して返す
    pub async fn items(&self) -> Vec<Marca> {
        match self.cache.read(&self.key()).await {
            CacheRead::Fresh(CachedValue::Paginada(paginas))
            | CacheRead::Stale(CachedValue::Paginada(paginas)) => paginas.items(),
            _ => Vec::new(),
        }
    }

    /// まだ続きがある可能性が残っているか
    pub async fn has_more(&self) -> bool {
        let (_, end_reached) = self.cache.pagina_state(&self.key()).await;
        !end_reached
    }

    /// 取得済みの全ページを破棄し、先頭から取り直せるようにする
    pub async fn reset(&self) {
        self.cache.invalidate(&self.key()).await;
    }
}
