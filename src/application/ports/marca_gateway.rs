use crate::domain::entities::{Marca, MarcaDraft, MarcaPatch, MarcasDetalles};
use crate::domain::value_objects::{MarcaFilter, MarcaId, PageRequest};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// マーカAPIへのリモートアクセスポート
#[async_trait]
pub trait MarcaGateway: Send + Sync {
    /// 条件に一致する一覧ページを取得
    async fn list(&self, filter: &MarcaFilter, page: &PageRequest)
        -> Result<Vec<Marca>, AppError>;

    /// ID指定で1件取得
    async fn detail(&self, id: MarcaId) -> Result<Marca, AppError>;

    /// 新規作成し、サーバ採番済みのレコードを返す
    async fn create(&self, draft: &MarcaDraft) -> Result<Marca, AppError>;

    /// 部分更新。サーバ確定値を返す
    async fn update(&self, id: MarcaId, patch: &MarcaPatch) -> Result<Marca, AppError>;

    /// 削除
    async fn delete(&self, id: MarcaId) -> Result<(), AppError>;

    /// ダッシュボード集計を取得
    async fn detalles(&self) -> Result<MarcasDetalles, AppError>;
}
