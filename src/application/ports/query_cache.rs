use crate::domain::entities::cache::{CacheRead, CacheStatusSnapshot, CachedValue, MutationSnapshot};
use crate::domain::entities::{Marca, MarcaPatch};
use crate::domain::value_objects::{MarcaId, QueryKey};
use async_trait::async_trait;

/// クエリ結果キャッシュのポート。
///
/// 楽観的ミューテーションの適用・確定・巻き戻しは、読み手が中途半端な
/// 状態を観測しないよう、それぞれ単一の操作として実装されること。
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// キャッシュを読む。鮮度切れの値は `Stale` として返す
    async fn read(&self, key: &QueryKey) -> CacheRead;

    /// フェッチ開始を宣言し、世代番号を進める。
    /// 同じキーで飛行中の古いフェッチはこの時点で無効になる
    async fn begin_fetch(&self, key: &QueryKey) -> u64;

    /// フェッチ結果を反映する。世代が進んでいた場合は破棄して `false`
    async fn complete_fetch(&self, key: &QueryKey, epoch: u64, value: CachedValue) -> bool;

    /// 楽観的プレースホルダ用のIDを払い出す（負数、再利用なし）
    async fn next_provisional_id(&self) -> MarcaId;

    /// 作成の楽観反映: 条件に合う全一覧エントリへ仮レコードを挿入する
    async fn optimistic_insert(&self, marca: &Marca) -> MutationSnapshot;

    /// 更新の楽観反映: 詳細と全一覧の該当レコードへパッチを適用する
    async fn optimistic_update(&self, id: MarcaId, patch: &MarcaPatch) -> MutationSnapshot;

    /// 削除の楽観反映: 全一覧から該当レコードを取り除く
    async fn optimistic_remove(&self, id: MarcaId) -> MutationSnapshot;

    /// 作成成功の確定: 仮IDのレコードを確定値へ置き換え、詳細を播種する
    async fn confirm_create(&self, provisional: MarcaId, confirmed: &Marca);

    /// 更新成功の確定: サーバ確定値で詳細と全一覧を上書きする
    async fn confirm_update(&self, confirmed: &Marca);

    /// 削除成功の確定: 詳細エントリを破棄する
    async fn confirm_delete(&self, id: MarcaId);

    /// 失敗したミューテーションの巻き戻し。スナップショットをそのまま戻す
    async fn restore(&self, snapshot: MutationSnapshot);

    /// 一覧系エントリの無効化。通常一覧は陳腐化マーク、ページ列は全ページ破棄
    async fn invalidate_listas(&self);

    /// 単一キーの無効化
    async fn invalidate(&self, key: &QueryKey);

    /// ページ取得の現在位置。(取得済み件数, 終端到達済みか)
    async fn pagina_state(&self, key: &QueryKey) -> (u32, bool);

    /// 取得したページを追加する。ページ件数が limit 未満なら終端とみなす
    async fn append_pagina(&self, key: &QueryKey, epoch: u64, page: Vec<Marca>, limit: u32)
        -> bool;

    /// キャッシュ全体の状態スナップショット
    async fn status(&self) -> CacheStatusSnapshot;

    /// 全エントリを破棄する
    async fn clear(&self);
}
