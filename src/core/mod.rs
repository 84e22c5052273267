// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

// 公開API - 明示的にエクスポートして曖昧性を回避
pub use error::{ErrorSeverity, HandoffError, HandoffResult, QueueError, QueueResult};
pub use traits::{HandoffQueue, ProgressReporter};
pub use types::{ConsumerExit, ConsumerReport, Message, ProducerReport, RunSummary};
