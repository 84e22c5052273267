// エンドツーエンド統合テスト
use crate::fixtures::{destination, sorted, RecordingReporter};
use handoff_queue::{
    transfer, BoundedQueue, Consumer, ConsumerExit, HandoffConfig, Message, Pipeline, Producer,
    RunReport,
};
use std::cell::Cell;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_single_pair_preserves_order() {
    let queue = Arc::new(BoundedQueue::new(3).unwrap());
    let dest = destination();

    let consumer = Consumer::new(Arc::clone(&queue), Arc::clone(&dest), "Consumer-1")
        .spawn()
        .unwrap();
    let producer = Producer::new(vec![1, 2, 3, 4, 5], Arc::clone(&queue), "Producer-1")
        .spawn()
        .unwrap();

    let produced = producer.join().unwrap();
    let consumed = consumer.join().unwrap();

    assert_eq!(*dest.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(produced.items_produced, 5);
    assert!(produced.end_of_stream_sent);
    assert_eq!(consumed.items_consumed, 5);
    assert_eq!(consumed.exit, ConsumerExit::EndOfStream);
    assert!(queue.is_empty());
}

#[test]
fn test_none_payload_is_not_end_of_stream() {
    let source = vec![Some(1), None, Some(3)];
    let summary = transfer(source.clone(), 1).unwrap();

    assert_eq!(summary.destination, source);
    assert_eq!(summary.items_consumed(), 3);
    assert!(summary.is_complete());
}

#[test]
fn test_payload_needs_only_send() {
    // Cell は Send だが Sync ではない
    let source: Vec<Cell<i32>> = (1..=5).map(Cell::new).collect();
    let summary = transfer(source.clone(), 2).unwrap();

    assert_eq!(summary.destination, source);
}

#[test]
fn test_empty_producer_enqueues_only_end_of_stream() {
    let queue: Arc<BoundedQueue<Message<i32>>> = Arc::new(BoundedQueue::new(2).unwrap());

    let report = Producer::new(Vec::new(), Arc::clone(&queue), "Producer-1").run();

    assert_eq!(report.items_produced, 0);
    assert!(report.end_of_stream_sent);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.get().unwrap(), Message::EndOfStream);
    assert!(queue.is_empty());
}

#[test]
fn test_empty_source_transfer() {
    let summary = transfer(Vec::<u8>::new(), 1).unwrap();

    assert!(summary.destination.is_empty());
    assert!(summary.is_complete());
    assert_eq!(summary.consumers[0].exit, ConsumerExit::EndOfStream);
}

#[test]
fn test_no_data_loss_with_many_producers() {
    let producers = 4;
    let per_producer = 250;
    let sources: Vec<Vec<usize>> = (0..producers)
        .map(|p| (0..per_producer).map(|i| p * per_producer + i).collect())
        .collect();

    let config = HandoffConfig::default()
        .with_capacity(5)
        .with_producers(producers)
        .with_consumers(1)
        .with_progress_reporting(false);
    let summary = Pipeline::new(config).unwrap().run(sources).unwrap();

    assert_eq!(summary.items_produced(), producers * per_producer);
    assert_eq!(summary.items_consumed(), producers * per_producer);
    assert_eq!(
        sorted(summary.destination),
        (0..producers * per_producer).collect::<Vec<_>>()
    );
}

#[test]
fn test_many_producers_many_consumers() {
    let reporter = RecordingReporter::new();
    let config = HandoffConfig::default()
        .with_capacity(2)
        .with_producers(3)
        .with_consumers(4)
        .with_join_timeout(Some(Duration::from_secs(10)));
    let pipeline = Pipeline::new(config).unwrap().with_reporter(reporter);

    let items: Vec<i64> = (1..=300).collect();
    let summary = pipeline.run_items(items.clone()).unwrap();

    assert!(summary.is_complete());
    assert_eq!(sorted(summary.destination.clone()), items);
    assert_eq!(summary.consumers.len(), 4);
    assert!(summary
        .consumers
        .iter()
        .all(|c| c.exit == ConsumerExit::Shutdown));

    let reporter = pipeline.reporter();
    for index in 1..=3 {
        assert_eq!(reporter.count(&format!("Producer-{index}"), "finished"), 1);
    }
    for consumer in &summary.consumers {
        assert_eq!(
            reporter.count(&consumer.name, "consumed"),
            consumer.items_consumed
        );
    }
}

#[test]
fn test_various_capacities() {
    let items: Vec<u32> = (0..100).collect();
    for capacity in [1, 2, 7, 100, 1000] {
        let summary = transfer(items.clone(), capacity).unwrap();
        assert_eq!(summary.destination, items, "capacity {capacity}");
    }
}

#[test]
fn test_producer_blocks_until_consumer_drains() {
    let queue = Arc::new(BoundedQueue::new(1).unwrap());
    let dest = destination();

    let producer = Producer::new(vec!["a", "b", "c"], Arc::clone(&queue), "Producer-1")
        .spawn()
        .unwrap();

    // 容量1なので "a" 投入後は残りを投入できない
    assert!(!producer.wait(Duration::from_millis(100)));
    assert!(producer.is_alive());
    assert_eq!(queue.len(), 1);

    let consumer = Consumer::new(Arc::clone(&queue), Arc::clone(&dest), "Consumer-1")
        .spawn()
        .unwrap();

    assert!(producer.wait(Duration::from_secs(5)));
    assert!(consumer.wait(Duration::from_secs(5)));
    producer.join().unwrap();
    consumer.join().unwrap();

    assert_eq!(*dest.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_consumer_started_late_receives_everything() {
    let queue = Arc::new(BoundedQueue::new(10).unwrap());
    let dest = destination();

    let producer = Producer::new(0..5, Arc::clone(&queue), "Producer-1")
        .spawn()
        .unwrap();
    producer.join().unwrap();
    assert_eq!(queue.len(), 6);

    let queue_for_consumer = Arc::clone(&queue);
    let dest_for_consumer = Arc::clone(&dest);
    let consumer = thread::spawn(move || {
        Consumer::new(queue_for_consumer, dest_for_consumer, "Consumer-1").run()
    });
    let report = consumer.join().unwrap();

    assert_eq!(report.items_consumed, 5);
    assert_eq!(*dest.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_report_from_pipeline_run() {
    let source: Vec<i64> = (1..=20).collect();
    let summary = transfer(source.clone(), 3).unwrap();
    let report = RunReport::new(&summary, &source, 3);

    assert!(report.success);
    assert_eq!(report.order_preserved, Some(true));
    assert!(report.render_text().contains("SUCCESS: All items transferred correctly!"));
}
