// 高レベル公開API
// Pipelineを簡単に使用できるようにするための便利な関数

use super::pipeline::Pipeline;
use crate::{
    core::{HandoffResult, RunSummary},
    services::{ConsoleProgressReporter, HandoffConfig},
};
use std::fmt::Debug;

/// 1 Producer / 1 Consumer でソース列を受け渡す最小構成
pub fn transfer<T>(source: Vec<T>, capacity: usize) -> HandoffResult<RunSummary<T>>
where
    T: Debug + Send + 'static,
{
    let config = HandoffConfig::default()
        .with_capacity(i64::try_from(capacity).unwrap_or(i64::MAX))
        .with_producers(1)
        .with_consumers(1);
    Pipeline::new(config)?.run(vec![source])
}

/// 設定に応じてコンソール出力付き、または静音のパイプラインを作成
pub fn create_console_pipeline(
    config: HandoffConfig,
) -> HandoffResult<Pipeline<ConsoleProgressReporter>> {
    let reporter = if config.progress {
        ConsoleProgressReporter::new()
    } else {
        ConsoleProgressReporter::quiet()
    };
    Ok(Pipeline::new(config)?.with_reporter(reporter))
}
