// キューを流れるデータ型とロールの実行結果型

use serde::Serialize;
use std::time::Duration;

/// キューに載せるメッセージ
///
/// 終端マーカーをペイロードとは別のバリアントで表現するため、
/// `Payload(None)` のような値も通常データとしてそのまま運べる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    Payload(T),
    EndOfStream,
}

impl<T> Message<T> {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// ペイロードを取り出す（終端マーカーなら `None`）
    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Payload(item) => Some(item),
            Self::EndOfStream => None,
        }
    }
}

impl<T> From<T> for Message<T> {
    fn from(item: T) -> Self {
        Self::Payload(item)
    }
}

/// Producerの実行結果（join後に参照する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProducerReport {
    pub name: String,
    pub items_produced: usize,
    pub end_of_stream_sent: bool,
    pub error: Option<String>,
}

/// Consumerが停止した理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerExit {
    /// 終端マーカーを受信した
    EndOfStream,
    /// キューがクローズされ、残りのアイテムも無くなった
    Shutdown,
    /// キュー操作が失敗した
    QueueError(String),
}

/// Consumerの実行結果（join後に参照する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerReport {
    pub name: String,
    pub items_consumed: usize,
    pub exit: ConsumerExit,
}

/// パイプライン全体のサマリー
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary<T> {
    pub source_count: usize,
    pub destination: Vec<T>,
    pub producers: Vec<ProducerReport>,
    pub consumers: Vec<ConsumerReport>,
    pub elapsed: Duration,
}

impl<T> RunSummary<T> {
    pub fn items_produced(&self) -> usize {
        self.producers.iter().map(|p| p.items_produced).sum()
    }

    pub fn items_consumed(&self) -> usize {
        self.consumers.iter().map(|c| c.items_consumed).sum()
    }

    /// 全アイテムが取りこぼし無く宛先に届いたか
    ///
    /// スレッド内で握り潰されたエラーは件数の不一致としてのみ観測できる。
    pub fn is_complete(&self) -> bool {
        self.source_count == self.destination.len()
            && self.items_produced() == self.source_count
            && self.items_consumed() == self.source_count
    }
}

impl<T: PartialEq> RunSummary<T> {
    /// 単一Producer時に宛先がソースと同順かどうか
    pub fn matches_source(&self, source: &[T]) -> bool {
        self.destination.as_slice() == source
    }
}
