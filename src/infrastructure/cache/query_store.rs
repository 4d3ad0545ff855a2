use crate::application::ports::query_cache::QueryCache;
use crate::domain::entities::cache::{
    CacheRead, CacheStatusSnapshot, CachedEntry, CachedValue, MutationSnapshot, PaginaSet,
};
use crate::domain::entities::{Marca, MarcaPatch};
use crate::domain::value_objects::{MarcaId, QueryKey};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct StoreInner {
    entries: HashMap<QueryKey, CachedEntry>,
    epochs: HashMap<QueryKey, u64>,
    next_provisional: i64,
}

/// クエリキー単位のインメモリキャッシュ。
///
/// 書き込みは単一のwriteロック区間で行い、読み手が一覧と詳細の
/// 中途半端な組み合わせを観測しないようにする。キーごとの世代番号で
/// 追い越されたフェッチの結果を破棄する。
pub struct QueryStore {
    inner: RwLock<StoreInner>,
    stale_after: Duration,
}

impl QueryStore {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                entries: HashMap::new(),
                epochs: HashMap::new(),
                next_provisional: 0,
            }),
            stale_after,
        }
    }

    fn is_expired(&self, entry: &CachedEntry) -> bool {
        entry.is_stale || entry.fetched_at.elapsed() >= self.stale_after
    }
}

#[async_trait]
impl QueryCache for QueryStore {
    async fn read(&self, key: &QueryKey) -> CacheRead {
        let inner = self.inner.read().await;
        match inner.entries.get(key) {
            Some(entry) if self.is_expired(entry) => CacheRead::Stale(entry.value.clone()),
            Some(entry) => CacheRead::Fresh(entry.value.clone()),
            None => CacheRead::Miss,
        }
    }

    async fn begin_fetch(&self, key: &QueryKey) -> u64 {
        let mut inner = self.inner.write().await;
        bump_epoch(&mut inner, key)
    }

    async fn complete_fetch(&self, key: &QueryKey, epoch: u64, value: CachedValue) -> bool {
        let mut inner = self.inner.write().await;
        if inner.epochs.get(key).copied().unwrap_or(0) != epoch {
            debug!(%key, "fetch result superseded, discarding");
            return false;
        }
        inner.entries.insert(key.clone(), CachedEntry::fresh(value));
        true
    }

    async fn next_provisional_id(&self) -> MarcaId {
        let mut inner = self.inner.write().await;
        inner.next_provisional -= 1;
        MarcaId::new(inner.next_provisional)
    }

    async fn optimistic_insert(&self, marca: &Marca) -> MutationSnapshot {
        let mut inner = self.inner.write().await;
        let mut snapshot = MutationSnapshot::default();
        let keys: Vec<QueryKey> = inner.entries.keys().cloned().collect();
        for key in keys {
            let matches = match &key {
                QueryKey::Lista(filter) | QueryKey::Paginada(filter) => filter.matches(marca),
                _ => false,
            };
            if !matches {
                continue;
            }
            let Some(entry) = inner.entries.get_mut(&key) else {
                continue;
            };
            snapshot.entries.push((key.clone(), entry.clone()));
            match &mut entry.value {
                CachedValue::Lista(items) => items.push(marca.clone()),
                CachedValue::Paginada(paginas) => match paginas.pages.last_mut() {
                    Some(last) => last.push(marca.clone()),
                    None => paginas.pages.push(vec![marca.clone()]),
                },
                _ => {}
            }
            bump_epoch(&mut inner, &key);
        }
        snapshot
    }

    async fn optimistic_update(&self, id: MarcaId, patch: &MarcaPatch) -> MutationSnapshot {
        let mut inner = self.inner.write().await;
        let mut snapshot = MutationSnapshot::default();
        let detail_key = QueryKey::detalle(id);
        // 飛行中の詳細読み取りに楽観状態を上書きさせない
        bump_epoch(&mut inner, &detail_key);

        if let Some(entry) = inner.entries.get_mut(&detail_key) {
            snapshot.entries.push((detail_key.clone(), entry.clone()));
            if let CachedValue::Detalle(marca) = &mut entry.value {
                marca.apply_patch(patch);
            }
        }

        let keys: Vec<QueryKey> = inner.entries.keys().cloned().collect();
        for key in keys {
            if !key.is_lista() {
                continue;
            }
            let Some(entry) = inner.entries.get_mut(&key) else {
                continue;
            };
            if !entry_contains(entry, id) {
                continue;
            }
            snapshot.entries.push((key.clone(), entry.clone()));
            patch_entry(entry, id, patch);
            bump_epoch(&mut inner, &key);
        }
        snapshot
    }

    async fn optimistic_remove(&self, id: MarcaId) -> MutationSnapshot {
        let mut inner = self.inner.write().await;
        let mut snapshot = MutationSnapshot::default();
        bump_epoch(&mut inner, &QueryKey::detalle(id));

        let keys: Vec<QueryKey> = inner.entries.keys().cloned().collect();
        for key in keys {
            if !key.is_lista() {
                continue;
            }
            let Some(entry) = inner.entries.get_mut(&key) else {
                continue;
            };
            if !entry_contains(entry, id) {
                continue;
            }
            snapshot.entries.push((key.clone(), entry.clone()));
            match &mut entry.value {
                CachedValue::Lista(items) => items.retain(|m| m.id != id),
                CachedValue::Paginada(paginas) => {
                    for page in &mut paginas.pages {
                        page.retain(|m| m.id != id);
                    }
                }
                _ => {}
            }
            bump_epoch(&mut inner, &key);
        }
        snapshot
    }

    async fn confirm_create(&self, provisional: MarcaId, confirmed: &Marca) {
        let mut inner = self.inner.write().await;
        replace_in_listas(&mut inner, provisional, confirmed);
        inner.entries.insert(
            QueryKey::detalle(confirmed.id),
            CachedEntry::fresh(CachedValue::Detalle(confirmed.clone())),
        );
    }

    async fn confirm_update(&self, confirmed: &Marca) {
        let mut inner = self.inner.write().await;
        replace_in_listas(&mut inner, confirmed.id, confirmed);
        inner.entries.insert(
            QueryKey::detalle(confirmed.id),
            CachedEntry::fresh(CachedValue::Detalle(confirmed.clone())),
        );
    }

    async fn confirm_delete(&self, id: MarcaId) {
        let mut inner = self.inner.write().await;
        inner.entries.remove(&QueryKey::detalle(id));
    }

    async fn restore(&self, snapshot: MutationSnapshot) {
        let mut inner = self.inner.write().await;
        for (key, entry) in snapshot.entries {
            inner.entries.insert(key, entry);
        }
    }

    async fn invalidate_listas(&self) {
        let mut inner = self.inner.write().await;
        let paginadas: Vec<QueryKey> = inner
            .entries
            .keys()
            .filter(|key| matches!(key, QueryKey::Paginada(_)))
            .cloned()
            .collect();
        for key in paginadas {
            inner.entries.remove(&key);
            bump_epoch(&mut inner, &key);
        }
        for (key, entry) in inner.entries.iter_mut() {
            if matches!(key, QueryKey::Lista(_)) {
                entry.is_stale = true;
            }
        }
    }

    async fn invalidate(&self, key: &QueryKey) {
        let mut inner = self.inner.write().await;
        match key {
            QueryKey::Paginada(_) => {
                inner.entries.remove(key);
                bump_epoch(&mut inner, key);
            }
            _ => {
                if let Some(entry) = inner.entries.get_mut(key) {
                    entry.is_stale = true;
                }
            }
        }
    }

    async fn pagina_state(&self, key: &QueryKey) -> (u32, bool) {
        let inner = self.inner.read().await;
        match inner.entries.get(key) {
            Some(CachedEntry {
                value: CachedValue::Paginada(paginas),
                ..
            }) => (paginas.len() as u32, paginas.end_reached),
            _ => (0, false),
        }
    }

    async fn append_pagina(
        &self,
        key: &QueryKey,
        epoch: u64,
        page: Vec<Marca>,
        limit: u32,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if inner.epochs.get(key).copied().unwrap_or(0) != epoch {
            debug!(%key, "page result superseded, discarding");
            return false;
        }
        let end_reached = (page.len() as u32) < limit;
        let entry = inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| CachedEntry::fresh(CachedValue::Paginada(PaginaSet::default())));
        entry.fetched_at = Instant::now();
        entry.last_synced_at = Utc::now();
        entry.is_stale = false;
        if let CachedValue::Paginada(paginas) = &mut entry.value {
            paginas.pages.push(page);
            paginas.end_reached = end_reached;
        }
        true
    }

    async fn status(&self) -> CacheStatusSnapshot {
        let inner = self.inner.read().await;
        let total_entries = inner.entries.len() as u64;
        let stale_entries = inner
            .entries
            .values()
            .filter(|entry| self.is_expired(entry))
            .count() as u64;
        let last_synced_at = inner
            .entries
            .values()
            .map(|entry| entry.last_synced_at)
            .max();
        CacheStatusSnapshot {
            total_entries,
            stale_entries,
            last_synced_at,
        }
    }

    async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
    }
}

fn bump_epoch(inner: &mut StoreInner, key: &QueryKey) -> u64 {
    let epoch = inner.epochs.entry(key.clone()).or_insert(0);
    *epoch += 1;
    *epoch
}

fn entry_contains(entry: &CachedEntry, id: MarcaId) -> bool {
    match &entry.value {
        CachedValue::Lista(items) => items.iter().any(|m| m.id == id),
        CachedValue::Paginada(paginas) => paginas.pages.iter().flatten().any(|m| m.id == id),
        _ => false,
    }
}

fn patch_entry(entry: &mut CachedEntry, id: MarcaId, patch: &MarcaPatch) {
    match &mut entry.value {
        CachedValue::Lista(items) => {
            for marca in items.iter_mut().filter(|m| m.id == id) {
                marca.apply_patch(patch);
            }
        }
        CachedValue::Paginada(paginas) => {
            for marca in paginas.pages.iter_mut().flatten().filter(|m| m.id == id) {
                marca.apply_patch(patch);
            }
        }
        _ => {}
    }
}

fn replace_in_listas(inner: &mut StoreInner, target: MarcaId, confirmed: &Marca) {
    for entry in inner.entries.values_mut() {
        match &mut entry.value {
            CachedValue::Lista(items) => {
                for marca in items.iter_mut().filter(|m| m.id == target) {
                    *marca = confirmed.clone();
                }
            }
            CachedValue::Paginada(paginas) => {
                for marca in paginas.pages.iter_mut().flatten().filter(|m| m.id == target) {
                    *marca = confirmed.clone();
                }
            }
            _ => {}
        }
    }
}
