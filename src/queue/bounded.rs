// 容量制限付きブロッキングFIFOキュー
// 1つのMutexと2つのCondvar（not_full / not_empty）で構成する

use crate::core::{HandoffQueue, QueueError, QueueResult};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// スレッドセーフな有界ブロッキングキュー
///
/// 満杯時の `put` と空時の `get` は条件が満たされるまで待機する。
/// 起床後は必ず条件を再確認する（スプリアスウェイクアップ・複数待機者対策）。
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// 新しいキューを作成（容量0は `InvalidArgument`）
    pub fn new(capacity: usize) -> QueueResult<Self> {
        if capacity == 0 {
            return Err(QueueError::invalid_argument(
                "capacity",
                "容量は1以上である必要があります",
            ));
        }

        Ok(Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        })
    }

    fn lock(&self) -> QueueResult<MutexGuard<'_, State<T>>> {
        self.state
            .lock()
            .map_err(|_| QueueError::queue_operation("キューのロックが汚染されています"))
    }

    // イントロスペクションとクローズは汚染されたロックでも状態を読む
    fn lock_lenient(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 末尾に追加する。満杯の間はブロックする
    pub fn put(&self, item: T) -> QueueResult<()> {
        let mut state = self.lock()?;
        while state.items.len() >= self.capacity && !state.closed {
            state = self
                .not_full
                .wait(state)
                .map_err(|_| QueueError::queue_operation("not_full の待機に失敗しました"))?;
        }
        if state.closed {
            return Err(QueueError::Closed);
        }

        state.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// 先頭を取り出す。空の間はブロックする
    ///
    /// クローズ後も残りのアイテムは取り出せるが、空になった後は
    /// 新しいアイテムが来ないため永久に待機する。
    pub fn get(&self) -> QueueResult<T> {
        let mut state = self.lock()?;
        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Ok(item);
            }
            state = self
                .not_empty
                .wait(state)
                .map_err(|_| QueueError::queue_operation("not_empty の待機に失敗しました"))?;
        }
    }

    /// 先頭を取り出す。空かつクローズ済みなら `Ok(None)` を返す
    pub fn get_unless_closed(&self) -> QueueResult<Option<T>> {
        let mut state = self.lock()?;
        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Ok(Some(item));
            }
            if state.closed {
                return Ok(None);
            }
            state = self
                .not_empty
                .wait(state)
                .map_err(|_| QueueError::queue_operation("not_empty の待機に失敗しました"))?;
        }
    }

    /// キューを閉じて、両方の条件で待機している全スレッドを起こす
    pub fn close(&self) {
        let mut state = self.lock_lenient();
        state.closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock_lenient().closed
    }

    pub fn len(&self) -> usize {
        self.lock_lenient().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> TryFrom<i64> for BoundedQueue<T> {
    type Error = QueueError;

    /// 符号付きの容量から作成（0以下は `InvalidArgument`）
    fn try_from(capacity: i64) -> QueueResult<Self> {
        if capacity <= 0 {
            return Err(QueueError::invalid_argument(
                "capacity",
                format!("容量は1以上である必要があります (指定値: {capacity})"),
            ));
        }
        let capacity = usize::try_from(capacity)
            .map_err(|e| QueueError::invalid_argument("capacity", e.to_string()))?;
        Self::new(capacity)
    }
}

impl<T: Send + 'static> HandoffQueue<T> for BoundedQueue<T> {
    fn put(&self, item: T) -> QueueResult<()> {
        BoundedQueue::put(self, item)
    }

    fn get(&self) -> QueueResult<T> {
        BoundedQueue::get(self)
    }

    fn get_unless_closed(&self) -> QueueResult<Option<T>> {
        BoundedQueue::get_unless_closed(self)
    }

    fn close(&self) {
        BoundedQueue::close(self)
    }

    fn is_closed(&self) -> bool {
        BoundedQueue::is_closed(self)
    }

    fn len(&self) -> usize {
        BoundedQueue::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Display for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundedQueue(capacity={}, size={})",
            self.capacity,
            self.len()
        )
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_lenient();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("size", &state.items.len())
            .field("closed", &state.closed)
            .finish()
    }
}
