// エンジン層 - ロールとオーケストレーション
// キュー層とサービス層を組み合わせて受け渡し処理を提供

pub mod api;
pub mod consumer;
pub mod handle;
pub mod pipeline;
pub mod producer;
pub mod shutdown;

// 公開API - 主要エンジンクラス
pub use api::{create_console_pipeline, transfer};
pub use consumer::{Consumer, SharedDestination};
pub use handle::RoleHandle;
pub use pipeline::{partition_source, Pipeline};
pub use producer::Producer;
pub use shutdown::{ShutdownCoordinator, ShutdownPolicy};
