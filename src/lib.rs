// 有界ブロッキングキューによるProducer/Consumer受け渡しライブラリ
//
// レイヤー構成:
// - core: エラー・メッセージ型・トレイト
// - queue: Mutex + Condvar による有界FIFOキュー
// - engine: Producer / Consumer / Pipeline とシャットダウン制御
// - services: 設定・進捗表示・結果レポート
// - cli: コマンドライン引数と実行

pub mod cli;
pub mod core;
pub mod engine;
pub mod queue;
pub mod services;

pub use crate::core::{
    ConsumerExit, ConsumerReport, HandoffError, HandoffQueue, HandoffResult, Message,
    ProducerReport, ProgressReporter, QueueError, QueueResult, RunSummary,
};
pub use engine::{transfer, Consumer, Pipeline, Producer, SharedDestination, ShutdownPolicy};
pub use queue::BoundedQueue;
pub use services::{HandoffConfig, RunReport};
