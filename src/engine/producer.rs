// Producer - ソース列をキューへ配信し、最後に終端マーカーを投入する

use super::handle::{OnPanic, RoleHandle};
use crate::{
    core::{HandoffQueue, HandoffResult, Message, ProducerReport, ProgressReporter, QueueError},
    services::NoOpProgressReporter,
};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, error, info_span, warn};

type Source<T> = Box<dyn Iterator<Item = anyhow::Result<T>> + Send>;

/// Producerロール
pub struct Producer<T, Q, R = NoOpProgressReporter> {
    name: String,
    source: Source<T>,
    queue: Arc<Q>,
    reporter: Arc<R>,
}

impl<T, Q> Producer<T, Q, NoOpProgressReporter>
where
    T: Debug + Send + 'static,
    Q: HandoffQueue<Message<T>> + Send + Sync + 'static,
{
    /// 失敗しないソース列から作成
    pub fn new<I>(source: I, queue: Arc<Q>, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::from_fallible(source.into_iter().map(Ok), queue, name)
    }

    /// 途中で失敗しうるソース列から作成
    pub fn from_fallible<I>(source: I, queue: Arc<Q>, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<T>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            name: name.into(),
            source: Box::new(source.into_iter()),
            queue,
            reporter: Arc::new(NoOpProgressReporter::new()),
        }
    }
}

impl<T, Q, R> Producer<T, Q, R>
where
    T: Debug + Send + 'static,
    Q: HandoffQueue<Message<T>> + Send + Sync + 'static,
    R: ProgressReporter + 'static,
{
    /// 進捗通知先を差し替える
    pub fn with_reporter<R2: ProgressReporter>(self, reporter: Arc<R2>) -> Producer<T, Q, R2> {
        Producer {
            name: self.name,
            source: self.source,
            queue: self.queue,
            reporter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 専用スレッドで起動
    pub fn spawn(self) -> HandoffResult<RoleHandle<ProducerReport>> {
        RoleHandle::spawn(self.name.clone(), move || self.run())
    }

    /// 呼び出しスレッド上で1回だけ実行する
    pub fn run(mut self) -> ProducerReport {
        let _span = info_span!("producer", name = %self.name).entered();
        let queue = Arc::clone(&self.queue);
        let _close_on_panic = OnPanic::new(move || {
            error!("producer panicked; closing queue");
            queue.close();
        });
        let mut items_produced = 0;
        let mut failure: Option<QueueError> = None;

        for next in self.source.by_ref() {
            let item = match next {
                Ok(item) => item,
                Err(source) => {
                    failure = Some(QueueError::source_iteration(self.name.as_str(), source));
                    break;
                }
            };

            let description = format!("{item:?}");
            if let Err(e) = self.queue.put(Message::Payload(item)) {
                failure = Some(e);
                break;
            }
            items_produced += 1;
            debug!(item = %description, "produced");
            self.reporter.report_produced(&self.name, &description);
        }

        if let Some(e) = &failure {
            e.log(&self.name, "producer stopped early");
            self.reporter.report_error(&self.name, &e.to_string());
        }

        let end_of_stream_sent = self.send_end_of_stream(failure.is_some());
        if failure.is_none() {
            self.reporter.report_finished(&self.name, items_produced);
        }

        ProducerReport {
            name: self.name.clone(),
            items_produced,
            end_of_stream_sent,
            error: failure.map(|e| e.to_string()),
        }
    }

    // 失敗後の投入はベストエフォートで、失敗しても握り潰す（リトライしない）。
    // ここで失敗するとConsumerが終端を受け取れず待ち続ける可能性がある。
    fn send_end_of_stream(&self, after_failure: bool) -> bool {
        match self.queue.put(Message::EndOfStream) {
            Ok(()) => true,
            Err(e) if after_failure => {
                warn!(error = %e, "best-effort end-of-stream failed; swallowed");
                false
            }
            Err(e) => {
                e.log(&self.name, "failed to enqueue end-of-stream");
                self.reporter.report_error(&self.name, &e.to_string());
                false
            }
        }
    }
}
