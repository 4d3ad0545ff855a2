use super::filter::MarcaFilter;
use super::marca_id::MarcaId;
use std::fmt;

/// キャッシュエントリを識別する複合キー。
/// キーが異なるクエリは独立したエントリとして扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// 絞り込み済み一覧
    Lista(MarcaFilter),
    /// 無限スクロール用のページ列
    Paginada(MarcaFilter),
    /// ID単位の詳細
    Detalle(MarcaId),
    /// ダッシュボード集計
    Detalles,
}

impl QueryKey {
    pub fn lista(filter: MarcaFilter) -> Self {
        QueryKey::Lista(filter)
    }

    pub fn paginada(filter: MarcaFilter) -> Self {
        QueryKey::Paginada(filter)
    }

    pub fn detalle(id: MarcaId) -> Self {
        QueryKey::Detalle(id)
    }

    pub fn is_lista(&self) -> bool {
        matches!(self, QueryKey::Lista(_) | QueryKey::Paginada(_))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Lista(filter) => write!(f, "marcas:lista:{}", filter),
            QueryKey::Paginada(filter) => write!(f, "marcas:paginada:{}", filter),
            QueryKey::Detalle(id) => write!(f, "marcas:detalle:{}", id),
            QueryKey::Detalles => write!(f, "marcas:detalles"),
        }
    }
}
