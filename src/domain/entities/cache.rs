use super::dashboard::MarcasDetalles;
use super::marca::Marca;
use crate::domain::value_objects::QueryKey;
use chrono::{DateTime, Utc};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Lista(Vec<Marca>),
    Paginada(PaginaSet),
    Detalle(Marca),
    Detalles(MarcasDetalles),
}

/// 無限スクロールで取得済みのページ列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginaSet {
    pub pages: Vec<Vec<Marca>>,
    pub end_reached: bool,
}

impl PaginaSet {
    /// 取得順に連結した全件
    pub fn items(&self) -> Vec<Marca> {
        self.pages.iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// キャッシュエントリの実体。値と鮮度メタデータを持つ
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub value: CachedValue,
    pub fetched_at: Instant,
    pub last_synced_at: DateTime<Utc>,
    pub is_stale: bool,
}

impl CachedEntry {
    pub fn fresh(value: CachedValue) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            last_synced_at: Utc::now(),
            is_stale: false,
        }
    }
}

#[derive(Debug)]
pub enum CacheRead {
    Fresh(CachedValue),
    Stale(CachedValue),
    Miss,
}

/// 失敗したミューテーションを元に戻すための変更前スナップショット
#[derive(Debug, Default)]
pub struct MutationSnapshot {
    pub entries: Vec<(QueryKey, CachedEntry)>,
}

impl MutationSnapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn touched_keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.iter().map(|(key, _)| key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatusSnapshot {
    pub total_entries: u64,
    pub stale_entries: u64,
    pub last_synced_at: Option<DateTime<Utc>>,
}
