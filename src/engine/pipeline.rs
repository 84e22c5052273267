// Pipeline - Producer-Consumer のオーケストレーション
// キュー・宛先・ロールを組み立てて起動し、全員をjoinしてからサマリーを返す

use super::{
    consumer::{Consumer, SharedDestination},
    handle::RoleHandle,
    producer::Producer,
    shutdown::ShutdownPolicy,
};
use crate::{
    core::{
        ConsumerReport, HandoffError, HandoffResult, Message, ProducerReport, ProgressReporter,
        QueueError, RunSummary,
    },
    queue::BoundedQueue,
    services::{HandoffConfig, NoOpProgressReporter},
};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{info, warn};

/// 設定に従ってロールを配線するパイプライン
pub struct Pipeline<R = NoOpProgressReporter> {
    config: HandoffConfig,
    reporter: Arc<R>,
}

impl Pipeline<NoOpProgressReporter> {
    /// 検証済みの設定からパイプラインを作成
    pub fn new(config: HandoffConfig) -> HandoffResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reporter: Arc::new(NoOpProgressReporter::new()),
        })
    }
}

impl<R> Clone for Pipeline<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<R: ProgressReporter + 'static> Pipeline<R> {
    pub fn with_reporter<R2: ProgressReporter>(self, reporter: R2) -> Pipeline<R2> {
        Pipeline {
            config: self.config,
            reporter: Arc::new(reporter),
        }
    }

    pub fn config(&self) -> &HandoffConfig {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// 1本のソース列を設定のProducer数に分割して実行
    pub fn run_items<T>(&self, items: Vec<T>) -> HandoffResult<RunSummary<T>>
    where
        T: Debug + Send + 'static,
    {
        self.run(partition_source(items, self.config.producers))
    }

    /// ソース列ごとに1 Producerを割り当てて実行
    ///
    /// 1 Producer / 1 Consumer 以外の構成ではブロードキャスト停止を使う。
    /// join タイムアウトが設定されていれば、期限切れでキューを閉じて
    /// 全ロールを起こしたうえで `Timeout` を返す。
    pub fn run<T>(&self, sources: Vec<Vec<T>>) -> HandoffResult<RunSummary<T>>
    where
        T: Debug + Send + 'static,
    {
        if sources.is_empty() {
            return Err(QueueError::invalid_argument(
                "sources",
                "Producerのソース列が1つもありません",
            )
            .into());
        }

        let start_time = Instant::now();
        let queue: Arc<BoundedQueue<Message<T>>> =
            Arc::new(BoundedQueue::try_from(self.config.capacity)?);
        let destination: SharedDestination<T> = Arc::new(Mutex::new(Vec::new()));
        let policy = ShutdownPolicy::for_roles(sources.len(), self.config.consumers);
        let source_count: usize = sources.iter().map(Vec::len).sum();

        info!(
            capacity = queue.capacity(),
            producers = sources.len(),
            consumers = self.config.consumers,
            source_count,
            "starting handoff"
        );

        // Consumer起動
        let mut consumers = Vec::with_capacity(self.config.consumers);
        for index in 0..self.config.consumers {
            let spawned = Consumer::new(
                Arc::clone(&queue),
                Arc::clone(&destination),
                format!("Consumer-{}", index + 1),
            )
            .with_policy(policy.clone())
            .with_reporter(Arc::clone(&self.reporter))
            .spawn();

            match spawned {
                Ok(handle) => consumers.push(handle),
                Err(e) => return Err(abort(&queue, Vec::new(), consumers, e)),
            }
        }

        // Producer起動
        let mut producers = Vec::with_capacity(sources.len());
        for (index, source) in sources.into_iter().enumerate() {
            let name = format!("Producer-{}", index + 1);
            let spawned = Producer::new(source, Arc::clone(&queue), name)
                .with_reporter(Arc::clone(&self.reporter))
                .spawn();

            match spawned {
                Ok(handle) => producers.push(handle),
                Err(e) => return Err(abort(&queue, producers, consumers, e)),
            }
        }

        let timed_out = self.config.join_timeout().and_then(|timeout| {
            let deadline = Instant::now() + timeout;
            first_unfinished(&producers, deadline)
                .or_else(|| first_unfinished(&consumers, deadline))
                .map(|role| (role, timeout))
        });
        if let Some((role, timeout)) = &timed_out {
            warn!(role = %role, ?timeout, "join timed out; closing queue");
            queue.close();
        }

        let mut first_error = None;
        let producer_reports: Vec<ProducerReport> = join_all(producers, &mut first_error);
        let consumer_reports: Vec<ConsumerReport> = join_all(consumers, &mut first_error);

        if let Some((role, timeout)) = timed_out {
            return Err(HandoffError::timeout(role, timeout));
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let destination =
            std::mem::take(&mut *destination.lock().unwrap_or_else(PoisonError::into_inner));
        let summary = RunSummary {
            source_count,
            destination,
            producers: producer_reports,
            consumers: consumer_reports,
            elapsed: start_time.elapsed(),
        };

        info!(
            elapsed_ms = summary.elapsed.as_millis() as u64,
            produced = summary.items_produced(),
            consumed = summary.items_consumed(),
            complete = summary.is_complete(),
            "handoff finished"
        );
        Ok(summary)
    }

    /// 非同期コンテキストから実行（ブロッキングスレッドプール上で動かす）
    pub async fn run_async<T>(&self, sources: Vec<Vec<T>>) -> HandoffResult<RunSummary<T>>
    where
        T: Debug + Send + 'static,
    {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.run(sources)).await?
    }
}

/// ソース列を `parts` 個の連続した区間に分割（先頭側ほど1件多くなる）
pub fn partition_source<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    let parts = parts.max(1);
    let (base, extra) = (items.len() / parts, items.len() % parts);
    let mut items = items.into_iter();

    (0..parts)
        .map(|index| {
            items
                .by_ref()
                .take(base + usize::from(index < extra))
                .collect()
        })
        .collect()
}

fn first_unfinished<R: Send + 'static>(
    handles: &[RoleHandle<R>],
    deadline: Instant,
) -> Option<String> {
    handles
        .iter()
        .find(|handle| !handle.wait(deadline.saturating_duration_since(Instant::now())))
        .map(|handle| handle.name().to_string())
}

// パニックしたロールは巻き戻り時に自分でキューを閉じるので、
// ここでは順に join するだけでよい
fn join_all<R: Send + 'static>(
    handles: Vec<RoleHandle<R>>,
    first_error: &mut Option<HandoffError>,
) -> Vec<R> {
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let role = handle.name().to_string();
        match handle.join() {
            Ok(report) => reports.push(report),
            Err(e) => {
                e.log(&role, "role thread failed");
                first_error.get_or_insert(e);
            }
        }
    }
    reports
}

// 起動途中で失敗した場合、起動済みロールを停止させてから回収する
fn abort<M>(
    queue: &BoundedQueue<M>,
    producers: Vec<RoleHandle<ProducerReport>>,
    consumers: Vec<RoleHandle<ConsumerReport>>,
    error: HandoffError,
) -> HandoffError {
    error.log("pipeline", "failed to start roles; aborting");
    queue.close();
    let mut ignored = None;
    join_all(producers, &mut ignored);
    join_all(consumers, &mut ignored);
    error
}
