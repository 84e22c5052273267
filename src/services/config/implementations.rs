// 設定管理の具象実装

use crate::core::{QueueError, QueueResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 受け渡しパイプラインの設定
///
/// `capacity` は設定ファイルやCLIから負値が入りうるため符号付きで保持し、
/// `validate` で検証する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    pub capacity: i64,
    pub producers: usize,
    pub consumers: usize,
    pub item_count: usize,
    pub join_timeout_ms: Option<u64>,
    pub progress: bool,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            producers: 1,
            consumers: 1,
            item_count: 120,
            join_timeout_ms: None,
            progress: true,
        }
    }
}

impl HandoffConfig {
    /// 大きめのバッファとCPU数ぶんのConsumer
    pub fn high_throughput() -> Self {
        Self {
            capacity: 64,
            producers: 2,
            consumers: num_cpus::get().max(1),
            item_count: 10_000,
            join_timeout_ms: Some(30_000),
            progress: false,
        }
    }

    /// 容量1で常にブロックが発生する小規模設定
    pub fn testing() -> Self {
        Self {
            capacity: 1,
            producers: 1,
            consumers: 1,
            item_count: 10,
            join_timeout_ms: Some(5_000),
            progress: false,
        }
    }

    /// プリセット名から作成（default / high_throughput / testing）
    pub fn preset(name: &str) -> QueueResult<Self> {
        match name {
            "default" => Ok(Self::default()),
            "high_throughput" | "high-throughput" => Ok(Self::high_throughput()),
            "testing" => Ok(Self::testing()),
            other => Err(QueueError::invalid_argument(
                "preset",
                format!("不明なプリセットです: {other}"),
            )),
        }
    }

    /// JSONファイルから読み込み、検証する
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読み込めません: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("設定ファイルの形式が不正です: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_producers(mut self, producers: usize) -> Self {
        self.producers = producers;
        self
    }

    pub fn with_consumers(mut self, consumers: usize) -> Self {
        self.consumers = consumers;
        self
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
    }

    pub fn with_join_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.join_timeout_ms = timeout.map(|t| t.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.progress = enable;
        self
    }

    pub fn join_timeout(&self) -> Option<Duration> {
        self.join_timeout_ms.map(Duration::from_millis)
    }

    /// 容量とロール数を検証
    pub fn validate(&self) -> QueueResult<()> {
        if self.capacity <= 0 {
            return Err(QueueError::invalid_argument(
                "capacity",
                format!("容量は1以上である必要があります (指定値: {})", self.capacity),
            ));
        }
        if self.producers == 0 {
            return Err(QueueError::invalid_argument(
                "producers",
                "Producer数は1以上である必要があります",
            ));
        }
        if self.consumers == 0 {
            return Err(QueueError::invalid_argument(
                "consumers",
                "Consumer数は1以上である必要があります",
            ));
        }
        Ok(())
    }
}
