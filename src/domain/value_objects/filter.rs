use super::estado::Estado;
use crate::domain::entities::Marca;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 一覧クエリの絞り込み条件。検索語はデバウンス確定後の値のみを受け取る。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarcaFilter {
    pub estado: Option<Estado>,
    search: Option<String>,
}

impl MarcaFilter {
    pub fn new(estado: Option<Estado>, search: Option<&str>) -> Self {
        let search = search
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty());
        Self { estado, search }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// レコードがこの条件に該当するか（サーバ側フィルタと同じ規則）
    pub fn matches(&self, marca: &Marca) -> bool {
        if let Some(estado) = self.estado {
            if marca.estado != estado {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let nombre = marca.nombre.to_lowercase();
            let titulo = marca.titulo.to_lowercase();
            if !nombre.contains(term.as_str()) && !titulo.contains(term.as_str()) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for MarcaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "estado={},search={}",
            self.estado.map(|e| e.to_string()).unwrap_or_default(),
            self.search.as_deref().unwrap_or_default()
        )
    }
}

/// オフセットカーソルによるページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}
