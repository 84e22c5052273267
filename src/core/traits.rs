// 受け渡しシステムのトレイト定義
// ロール（Producer/Consumer）が依存する抽象化インターフェース

use super::error::QueueResult;
use mockall::automock;

/// ブロッキングキューの抽象化トレイト
///
/// `put` は満杯の間、`get` は空の間それぞれ呼び出しスレッドを停止させる。
/// タイムアウトやキャンセルは持たない。待機を打ち切りたい場合は
/// `close` でキュー全体を閉じる。
///
/// スレッド間共有に必要な `Send + Sync` はロール側の境界で要求する
/// （生成されるモックは `T: Sync` のときのみ `Sync`）。
#[automock]
pub trait HandoffQueue<T: Send + 'static> {
    /// 末尾に追加（満杯なら空きが出るまでブロック）
    fn put(&self, item: T) -> QueueResult<()>;

    /// 先頭を取り出す（空ならアイテムが来るまでブロック）
    fn get(&self) -> QueueResult<T>;

    /// 先頭を取り出す。空かつクローズ済みなら `Ok(None)`
    fn get_unless_closed(&self) -> QueueResult<Option<T>>;

    /// キューを閉じ、待機中の全スレッドを起こす
    fn close(&self);

    fn is_closed(&self) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}

/// 進捗通知の抽象化トレイト
///
/// 通知は副作用のみで、受け渡しの正しさには関与しない。
#[automock]
pub trait ProgressReporter: Send + Sync {
    /// Producerがアイテムを1件投入した
    fn report_produced(&self, role: &str, item: &str);

    /// Consumerがアイテムを1件宛先に追加した
    fn report_consumed(&self, role: &str, item: &str);

    /// ロールが終了した
    fn report_finished(&self, role: &str, count: usize);

    /// ロール内でエラーが発生した（伝播はしない）
    fn report_error(&self, role: &str, error: &str);
}

// ProgressReporter for Box<dyn ProgressReporter>
impl ProgressReporter for Box<dyn ProgressReporter> {
    fn report_produced(&self, role: &str, item: &str) {
        self.as_ref().report_produced(role, item)
    }

    fn report_consumed(&self, role: &str, item: &str) {
        self.as_ref().report_consumed(role, item)
    }

    fn report_finished(&self, role: &str, count: usize) {
        self.as_ref().report_finished(role, count)
    }

    fn report_error(&self, role: &str, error: &str) {
        self.as_ref().report_error(role, error)
    }
}
