// 停止処理（終端マーカー・クローズ・タイムアウト）の統合テスト
use crate::fixtures::{destination, sorted};
use handoff_queue::{
    engine::ShutdownCoordinator, BoundedQueue, Consumer, ConsumerExit, HandoffConfig,
    HandoffError, Message, Pipeline, Producer, ProgressReporter, QueueError, ShutdownPolicy,
};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_broadcast_stops_every_consumer() {
    let queue = Arc::new(BoundedQueue::new(4).unwrap());
    let dest = destination();
    let coordinator = Arc::new(ShutdownCoordinator::new(2));

    let consumers: Vec<_> = (1..=3)
        .map(|index| {
            Consumer::new(Arc::clone(&queue), Arc::clone(&dest), format!("Consumer-{index}"))
                .with_policy(ShutdownPolicy::Broadcast(Arc::clone(&coordinator)))
                .spawn()
                .unwrap()
        })
        .collect();
    let producers: Vec<_> = [0..50, 50..100]
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            Producer::new(range, Arc::clone(&queue), format!("Producer-{}", index + 1))
                .spawn()
                .unwrap()
        })
        .collect();

    for producer in producers {
        assert!(producer.join().unwrap().end_of_stream_sent);
    }
    let reports: Vec<_> = consumers
        .into_iter()
        .map(|consumer| consumer.join().unwrap())
        .collect();

    assert_eq!(coordinator.remaining(), 0);
    assert!(queue.is_closed());
    assert!(reports.iter().all(|r| r.exit == ConsumerExit::Shutdown));
    assert_eq!(reports.iter().map(|r| r.items_consumed).sum::<usize>(), 100);
    assert_eq!(
        sorted(dest.lock().unwrap().clone()),
        (0..100).collect::<Vec<_>>()
    );
}

#[test]
fn test_first_end_of_stream_leaves_other_consumer_waiting() {
    let queue: Arc<BoundedQueue<Message<i32>>> = Arc::new(BoundedQueue::new(2).unwrap());
    let dest = destination();

    let first = Consumer::new(Arc::clone(&queue), Arc::clone(&dest), "Consumer-1")
        .spawn()
        .unwrap();
    let second = Consumer::new(Arc::clone(&queue), Arc::clone(&dest), "Consumer-2")
        .spawn()
        .unwrap();

    Producer::new(vec![1, 2], Arc::clone(&queue), "Producer-1").run();

    // 終端マーカーは1つだけなので、どちらか一方は待ち続ける
    let deadline = Duration::from_millis(300);
    let finished = [first.wait(deadline), second.wait(deadline)];
    assert_eq!(finished.iter().filter(|done| **done).count(), 1);

    // 呼び出し側がキューを閉じれば残りも終了する
    queue.close();
    let exits = [first.join().unwrap().exit, second.join().unwrap().exit];
    assert!(exits.contains(&ConsumerExit::EndOfStream));
    assert!(exits.contains(&ConsumerExit::Shutdown));
    assert_eq!(sorted(dest.lock().unwrap().clone()), vec![1, 2]);
}

#[test]
fn test_close_wakes_blocked_producer() {
    let queue = Arc::new(BoundedQueue::new(1).unwrap());
    let producer = Producer::new(vec![1, 2, 3], Arc::clone(&queue), "Producer-1")
        .spawn()
        .unwrap();

    assert!(!producer.wait(Duration::from_millis(100)));
    queue.close();

    let report = producer.join().unwrap();
    assert_eq!(report.items_produced, 1);
    assert!(!report.end_of_stream_sent);
    assert_eq!(report.error, Some(QueueError::Closed.to_string()));
}

#[test]
fn test_close_drains_remaining_items_first() {
    let queue = BoundedQueue::new(3).unwrap();
    queue.put(Message::Payload("x")).unwrap();
    queue.put(Message::Payload("y")).unwrap();
    queue.close();

    let dest = destination();
    let report = Consumer::new(Arc::new(queue), Arc::clone(&dest), "Consumer-1").run();

    assert_eq!(report.exit, ConsumerExit::Shutdown);
    assert_eq!(*dest.lock().unwrap(), vec!["x", "y"]);
}

struct SlowConsumerReporter;

impl ProgressReporter for SlowConsumerReporter {
    fn report_produced(&self, _role: &str, _item: &str) {}

    fn report_consumed(&self, _role: &str, _item: &str) {
        thread::sleep(Duration::from_millis(25));
    }

    fn report_finished(&self, _role: &str, _count: usize) {}

    fn report_error(&self, _role: &str, _error: &str) {}
}

#[test]
fn test_join_timeout_returns_error() {
    let config = HandoffConfig::default()
        .with_capacity(2)
        .with_producers(2)
        .with_consumers(2)
        .with_join_timeout(Some(Duration::from_millis(150)));
    let pipeline = Pipeline::new(config)
        .unwrap()
        .with_reporter(SlowConsumerReporter);

    let started = Instant::now();
    let error = pipeline
        .run_items((0..200).collect::<Vec<i32>>())
        .unwrap_err();

    assert!(matches!(error, HandoffError::Timeout { timeout, .. } if timeout == Duration::from_millis(150)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_no_timeout_when_run_finishes_in_time() {
    let config = HandoffConfig::testing().with_join_timeout(Some(Duration::from_secs(5)));
    let summary = Pipeline::new(config)
        .unwrap()
        .run_items(vec![10, 20, 30])
        .unwrap();

    assert_eq!(summary.destination, vec![10, 20, 30]);
}

struct PanicOnConsume;

impl ProgressReporter for PanicOnConsume {
    fn report_produced(&self, _role: &str, _item: &str) {}

    fn report_consumed(&self, _role: &str, _item: &str) {
        panic!("reporter failure");
    }

    fn report_finished(&self, _role: &str, _count: usize) {}

    fn report_error(&self, _role: &str, _error: &str) {}
}

#[test]
fn test_consumer_panic_releases_blocked_roles() {
    let config = HandoffConfig::default()
        .with_capacity(1)
        .with_producers(2)
        .with_consumers(3);
    let pipeline = Pipeline::new(config)
        .unwrap()
        .with_reporter(PanicOnConsume);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(pipeline.run_items((0..20).collect::<Vec<i32>>()));
    });

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("pipeline did not return after a consumer panicked");
    assert!(matches!(result, Err(HandoffError::RolePanicked { ref role }) if role.starts_with("Consumer-")));
}

#[test]
fn test_producer_panic_releases_idle_consumers() {
    struct PanicOnProduce;

    impl ProgressReporter for PanicOnProduce {
        fn report_produced(&self, _role: &str, _item: &str) {
            panic!("reporter failure");
        }

        fn report_consumed(&self, _role: &str, _item: &str) {}

        fn report_finished(&self, _role: &str, _count: usize) {}

        fn report_error(&self, _role: &str, _error: &str) {}
    }

    let pipeline = Pipeline::new(HandoffConfig::default().with_consumers(2))
        .unwrap()
        .with_reporter(PanicOnProduce);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(pipeline.run(vec![vec![1, 2, 3]]));
    });

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("pipeline did not return after the producer panicked");
    assert!(matches!(result, Err(HandoffError::RolePanicked { ref role }) if role == "Producer-1"));
}
