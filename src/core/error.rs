// キュー受け渡し用のカスタムエラー型定義
// キュー操作エラーとオーケストレーションエラーを分離する

use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// キュー・ロール（Producer/Consumer）レベルのエラー型
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("引数エラー: {field} - {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("ソース読み出しエラー: {producer} - {source}")]
    SourceIteration {
        producer: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("キュー操作エラー: {message}")]
    QueueOperation { message: String },

    #[error("キューは既にクローズされています")]
    Closed,
}

impl QueueError {
    /// 引数エラーの作成
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// ソース読み出しエラーの作成
    pub fn source_iteration(producer: impl Into<String>, source: anyhow::Error) -> Self {
        Self::SourceIteration {
            producer: producer.into(),
            source,
        }
    }

    /// キュー操作エラーの作成
    pub fn queue_operation(message: impl Into<String>) -> Self {
        Self::QueueOperation {
            message: message.into(),
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidArgument { .. } => ErrorSeverity::Critical,
            Self::SourceIteration { .. } => ErrorSeverity::Medium,
            Self::QueueOperation { .. } => ErrorSeverity::High,
            Self::Closed => ErrorSeverity::Low,
        }
    }

    /// 重要度に応じたレベルでログ出力する
    pub fn log(&self, role: &str, message: &str) {
        self.severity().log(role, self, message);
    }
}

/// パイプライン（オーケストレーション）レベルのエラー型
#[derive(Error, Debug)]
pub enum HandoffError {
    #[error("設定エラー: {source}")]
    Configuration {
        #[source]
        source: QueueError,
    },

    #[error("スレッド起動エラー: {role} - {source}")]
    Spawn {
        role: String,
        #[source]
        source: std::io::Error,
    },

    #[error("スレッドがパニックしました: {role}")]
    RolePanicked { role: String },

    #[error("タイムアウト: {role} が {timeout:?} 以内に終了しませんでした")]
    Timeout { role: String, timeout: Duration },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl HandoffError {
    /// スレッド起動エラーの作成
    pub fn spawn(role: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            role: role.into(),
            source,
        }
    }

    /// パニックエラーの作成
    pub fn role_panicked(role: impl Into<String>) -> Self {
        Self::RolePanicked { role: role.into() }
    }

    /// タイムアウトエラーの作成
    pub fn timeout(role: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            role: role.into(),
            timeout,
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration { .. } => ErrorSeverity::High,
            Self::Spawn { .. } | Self::RolePanicked { .. } => ErrorSeverity::Critical,
            Self::Timeout { .. } | Self::Task { .. } => ErrorSeverity::Medium,
        }
    }

    /// 重要度に応じたレベルでログ出力する
    pub fn log(&self, role: &str, message: &str) {
        self.severity().log(role, self, message);
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - 処理続行不可
    Critical,
}

impl ErrorSeverity {
    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// LOW は debug、MEDIUM は warn、HIGH 以上は error で記録
    pub fn log(self, role: &str, error: &dyn Display, message: &str) {
        let severity = self.as_str();
        match self {
            Self::Low => debug!(role, severity, error = %error, "{message}"),
            Self::Medium => warn!(role, severity, error = %error, "{message}"),
            Self::High | Self::Critical => error!(role, severity, error = %error, "{message}"),
        }
    }
}

/// キュー操作の結果型
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// パイプライン実行の結果型
pub type HandoffResult<T> = std::result::Result<T, HandoffError>;

impl From<QueueError> for HandoffError {
    fn from(error: QueueError) -> Self {
        HandoffError::Configuration { source: error }
    }
}

impl From<tokio::task::JoinError> for HandoffError {
    fn from(error: tokio::task::JoinError) -> Self {
        HandoffError::Task { source: error }
    }
}
