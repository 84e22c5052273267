// Consumer - キューから取り出したアイテムを共有宛先へ追加する

use super::{
    handle::{OnPanic, RoleHandle},
    shutdown::ShutdownPolicy,
};
use crate::{
    core::{
        ConsumerExit, ConsumerReport, HandoffQueue, HandoffResult, Message, ProgressReporter,
        QueueError, QueueResult,
    },
    services::NoOpProgressReporter,
};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info_span};

/// 呼び出し側が所有し、全Consumerで共有する宛先コレクション
pub type SharedDestination<T> = Arc<Mutex<Vec<T>>>;

/// Consumerロール
pub struct Consumer<T, Q, R = NoOpProgressReporter> {
    name: String,
    queue: Arc<Q>,
    destination: SharedDestination<T>,
    policy: ShutdownPolicy,
    reporter: Arc<R>,
}

impl<T, Q> Consumer<T, Q, NoOpProgressReporter>
where
    T: Debug + Send + 'static,
    Q: HandoffQueue<Message<T>> + Send + Sync + 'static,
{
    pub fn new(queue: Arc<Q>, destination: SharedDestination<T>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue,
            destination,
            policy: ShutdownPolicy::default(),
            reporter: Arc::new(NoOpProgressReporter::new()),
        }
    }
}

impl<T, Q, R> Consumer<T, Q, R>
where
    T: Debug + Send + 'static,
    Q: HandoffQueue<Message<T>> + Send + Sync + 'static,
    R: ProgressReporter + 'static,
{
    /// 停止方針を設定
    pub fn with_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 進捗通知先を差し替える
    pub fn with_reporter<R2: ProgressReporter>(self, reporter: Arc<R2>) -> Consumer<T, Q, R2> {
        Consumer {
            name: self.name,
            queue: self.queue,
            destination: self.destination,
            policy: self.policy,
            reporter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 専用スレッドで起動
    pub fn spawn(self) -> HandoffResult<RoleHandle<ConsumerReport>> {
        RoleHandle::spawn(self.name.clone(), move || self.run())
    }

    /// 終端マーカー（またはキューのクローズ）を観測するまで取り出し続ける
    pub fn run(self) -> ConsumerReport {
        let _span = info_span!("consumer", name = %self.name).entered();
        let queue = Arc::clone(&self.queue);
        let _close_on_panic = OnPanic::new(move || {
            error!("consumer panicked; closing queue");
            queue.close();
        });
        let mut items_consumed = 0;

        let exit = loop {
            let message = match self.queue.get_unless_closed() {
                Ok(Some(message)) => message,
                Ok(None) => break ConsumerExit::Shutdown,
                Err(e) => break self.fail(e, items_consumed),
            };

            let item = match message {
                Message::Payload(item) => item,
                Message::EndOfStream => match &self.policy {
                    ShutdownPolicy::FirstEndOfStream => break ConsumerExit::EndOfStream,
                    ShutdownPolicy::Broadcast(coordinator) => {
                        if coordinator.observe_end_of_stream() {
                            debug!("last end-of-stream observed; closing queue");
                            self.queue.close();
                        }
                        continue;
                    }
                },
            };

            let description = format!("{item:?}");
            if let Err(e) = self.append(item) {
                break self.fail(e, items_consumed);
            }
            items_consumed += 1;
            debug!(item = %description, "consumed");
            self.reporter.report_consumed(&self.name, &description);
        };

        if !matches!(exit, ConsumerExit::QueueError(_)) {
            self.reporter.report_finished(&self.name, items_consumed);
        }

        ConsumerReport {
            name: self.name.clone(),
            items_consumed,
            exit,
        }
    }

    // キューのロックを保持しない状態で宛先のロックを取る
    fn append(&self, item: T) -> QueueResult<()> {
        let mut destination = self
            .destination
            .lock()
            .map_err(|_| QueueError::queue_operation("宛先のロックが汚染されています"))?;
        destination.push(item);
        Ok(())
    }

    fn fail(&self, e: QueueError, items_consumed: usize) -> ConsumerExit {
        debug!(items_consumed, "consumer stopping");
        e.log(&self.name, "consumer stopped on queue error");
        self.reporter.report_error(&self.name, &e.to_string());
        ConsumerExit::QueueError(e.to_string())
    }
}
