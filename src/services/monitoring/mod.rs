// 進捗監視機能
// 投入・取り出しの通知、エラー通知、終了通知

pub mod implementations;

// 公開API
pub use implementations::{ConsoleProgressReporter, NoOpProgressReporter};
