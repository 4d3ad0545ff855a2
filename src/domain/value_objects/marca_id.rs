use serde::{Deserialize, Serialize};
use std::fmt;

/// マーカのID。サーバ採番は正、楽観的プレースホルダは負。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarcaId(i64);

impl MarcaId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// サーバに永続化済みのIDかどうか
    pub fn is_persisted(&self) -> bool {
        self.0 > 0
    }

    /// 楽観的更新用のプレースホルダIDかどうか
    pub fn is_provisional(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for MarcaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MarcaId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MarcaId> for i64 {
    fn from(id: MarcaId) -> Self {
        id.0
    }
}
