// 複数Consumer向けのブロードキャスト停止
// 全Producerの終端マーカーを数え、最後の1つでキューを閉じる

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 終端マーカーの受信数を集計する調停役
///
/// キューはFIFOなので、各Producerの終端マーカーはそのProducerの全アイテムより後ろにある。
/// 最後の終端マーカーが取り出された時点で残りの実データは存在しないため、
/// そこでキューを閉じれば待機中の全Consumerが一斉に終了できる。
#[derive(Debug)]
pub struct ShutdownCoordinator {
    expected: usize,
    observed: AtomicUsize,
}

impl ShutdownCoordinator {
    pub fn new(expected_producers: usize) -> Self {
        Self {
            expected: expected_producers,
            observed: AtomicUsize::new(0),
        }
    }

    /// 終端マーカーを1つ受信したことを記録する
    ///
    /// 期待数に達した呼び出しでのみ `true` を返す（ちょうど1回）。
    pub fn observe_end_of_stream(&self) -> bool {
        let observed = self.observed.fetch_add(1, Ordering::AcqRel) + 1;
        observed == self.expected
    }

    pub fn remaining(&self) -> usize {
        self.expected
            .saturating_sub(self.observed.load(Ordering::Acquire))
    }
}

/// Consumerの停止方針
#[derive(Debug, Clone, Default)]
pub enum ShutdownPolicy {
    /// 最初の終端マーカーで停止する（1 Producer / 1 Consumer 用）
    #[default]
    FirstEndOfStream,
    /// 全Producerの終端マーカーを集計し、キューのクローズで全員停止する
    Broadcast(Arc<ShutdownCoordinator>),
}

impl ShutdownPolicy {
    /// ロール数に応じた方針を選ぶ
    pub fn for_roles(producers: usize, consumers: usize) -> Self {
        if producers == 1 && consumers == 1 {
            Self::FirstEndOfStream
        } else {
            Self::Broadcast(Arc::new(ShutdownCoordinator::new(producers)))
        }
    }
}
