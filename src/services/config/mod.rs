// 設定管理機能
// プリセット、JSON設定ファイル、検証

pub mod implementations;

pub use implementations::HandoffConfig;
