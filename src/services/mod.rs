// サービス層 - ロール周辺の付随機能
// 進捗通知・設定・結果レポートをそれぞれ独立して提供する

pub mod config;
pub mod monitoring;
pub mod reporting;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::HandoffConfig;
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
pub use reporting::RunReport;
