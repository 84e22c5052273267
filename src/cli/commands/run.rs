use crate::{
    engine::{create_console_pipeline, partition_source},
    services::{HandoffConfig, RunReport},
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Options for the run command, mirroring the CLI flags
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub capacity: Option<i64>,
    pub items: Option<usize>,
    pub producers: Option<usize>,
    pub consumers: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub preset: Option<String>,
    pub config: Option<PathBuf>,
    pub quiet: bool,
    pub json: bool,
}

impl RunOptions {
    /// 設定ファイル → プリセット → デフォルトの順で土台を選び、CLI指定で上書き
    pub fn resolve_config(&self) -> Result<HandoffConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => HandoffConfig::from_json_file(path)?,
            (None, Some(preset)) => HandoffConfig::preset(preset)?,
            (None, None) => HandoffConfig::default(),
        };

        if let Some(capacity) = self.capacity {
            config = config.with_capacity(capacity);
        }
        if let Some(items) = self.items {
            config = config.with_item_count(items);
        }
        if let Some(producers) = self.producers {
            config = config.with_producers(producers);
        }
        if let Some(consumers) = self.consumers {
            config = config.with_consumers(consumers);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_join_timeout(Some(Duration::from_millis(timeout_ms)));
        }
        if self.quiet || self.json {
            config = config.with_progress_reporting(false);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run the handoff demo and print the report. Returns whether every item arrived intact.
pub async fn execute_run(options: RunOptions) -> Result<bool> {
    let config = options.resolve_config()?;
    let line_width = 60;

    let item_count = i64::try_from(config.item_count).context("アイテム数が範囲外です")?;
    let source: Vec<i64> = (1..=item_count).collect();
    let capacity = usize::try_from(config.capacity).context("容量が範囲外です")?;

    if !options.json {
        println!("{}", "=".repeat(line_width));
        println!("Producer-Consumer handoff with a bounded blocking queue");
        println!("{}", "=".repeat(line_width));
        println!("Queue capacity: {capacity}");
        println!(
            "Producers: {}, Consumers: {}, Items: {}",
            config.producers,
            config.consumers,
            source.len()
        );
        println!("{}", "-".repeat(line_width));
    }

    let sources = partition_source(source.clone(), config.producers);
    let pipeline = create_console_pipeline(config)?;
    let summary = pipeline
        .run_async(sources)
        .await
        .context("受け渡し処理に失敗しました")?;

    let report = RunReport::new(&summary, &source, capacity);
    if options.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", "-".repeat(line_width));
        println!("{}", report.render_text());
    }

    Ok(report.success)
}
