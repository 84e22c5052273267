// 実行結果レポートの具象実装
// join後のサマリーからテキスト・JSONのレポートを作る

use crate::core::{ConsumerReport, ProducerReport, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

const PREVIEW_LEN: usize = 10;
const LINE_WIDTH: usize = 60;

/// 1回の実行結果レポート
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T> {
    pub finished_at: DateTime<Utc>,
    pub capacity: usize,
    pub source_items: usize,
    pub destination_items: usize,
    pub items_produced: usize,
    pub items_consumed: usize,
    pub elapsed_ms: f64,
    pub success: bool,
    pub order_preserved: Option<bool>,
    pub missing: Vec<T>,
    pub extra: Vec<T>,
    pub source_preview: Vec<T>,
    pub destination_preview: Vec<T>,
    pub producers: Vec<ProducerReport>,
    pub consumers: Vec<ConsumerReport>,
}

impl<T> RunReport<T>
where
    T: Clone + Eq + Hash + Debug,
{
    /// サマリーと元のソース列からレポートを作成
    ///
    /// 1 Producer / 1 Consumer 以外では順序が規定されないため `order_preserved` は `None`。
    pub fn new(summary: &RunSummary<T>, source: &[T], capacity: usize) -> Self {
        let source_set: HashSet<&T> = source.iter().collect();
        let destination_set: HashSet<&T> = summary.destination.iter().collect();

        let missing = source
            .iter()
            .filter(|item| !destination_set.contains(item))
            .cloned()
            .collect();
        let extra = summary
            .destination
            .iter()
            .filter(|item| !source_set.contains(item))
            .cloned()
            .collect();

        let order_preserved = (summary.producers.len() == 1 && summary.consumers.len() == 1)
            .then(|| summary.matches_source(source));

        Self {
            finished_at: Utc::now(),
            capacity,
            source_items: source.len(),
            destination_items: summary.destination.len(),
            items_produced: summary.items_produced(),
            items_consumed: summary.items_consumed(),
            elapsed_ms: summary.elapsed.as_secs_f64() * 1000.0,
            success: summary.is_complete() && order_preserved.unwrap_or(true),
            order_preserved,
            missing,
            extra,
            source_preview: source.iter().take(PREVIEW_LEN).cloned().collect(),
            destination_preview: summary.destination.iter().take(PREVIEW_LEN).cloned().collect(),
            producers: summary.producers.clone(),
            consumers: summary.consumers.clone(),
        }
    }

    /// 人間向けのテキストレポート
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl<T: Debug> Display for RunReport<T> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(LINE_WIDTH);
        writeln!(out, "{rule}")?;
        writeln!(out, "Results:")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Queue capacity:    {}", self.capacity)?;
        writeln!(out, "Source items:      {}", self.source_items)?;
        writeln!(out, "Destination items: {}", self.destination_items)?;
        writeln!(out, "Items produced:    {}", self.items_produced)?;
        writeln!(out, "Items consumed:    {}", self.items_consumed)?;
        writeln!(out, "Execution time:    {:.3} seconds", self.elapsed_ms / 1000.0)?;
        for producer in &self.producers {
            let status = producer.error.as_deref().unwrap_or("ok");
            writeln!(
                out,
                "  {:<16} produced {:>6} ({status})",
                producer.name, producer.items_produced
            )?;
        }
        for consumer in &self.consumers {
            writeln!(
                out,
                "  {:<16} consumed {:>6} ({:?})",
                consumer.name, consumer.items_consumed, consumer.exit
            )?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "Source data:       {:?}... (showing first {} of {} items)",
            self.source_preview,
            self.source_preview.len(),
            self.source_items
        )?;
        writeln!(
            out,
            "Destination data:  {:?}... (showing first {} of {} items)",
            self.destination_preview,
            self.destination_preview.len(),
            self.destination_items
        )?;
        writeln!(out)?;

        if self.success {
            writeln!(out, "SUCCESS: All items transferred correctly!")?;
        } else {
            writeln!(out, "ERROR: Data mismatch detected!")?;
            writeln!(out, "  Missing items: {:?}", self.missing)?;
            writeln!(out, "  Extra items: {:?}", self.extra)?;
            if self.order_preserved == Some(false) {
                writeln!(out, "  Destination order differs from source order")?;
            }
        }
        write!(out, "{rule}")
    }
}

impl<T: Serialize> RunReport<T> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
