use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// 検索入力を一定時間まとめるデバウンサ
///
/// 値を送信するたびにタイマーがリセットされ、遅延内に新しい送信が
/// なければその値が確定する。確定した値だけがクエリキーに渡される。
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// 値を送信し、確定した場合のみ `Some` を返す
    pub async fn submit(&self, value: String) -> Option<String> {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) == mine {
            Some(value)
        } else {
            None
        }
    }
}
