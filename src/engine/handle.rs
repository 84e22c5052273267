// ロールのスレッドハンドル - start / join / is_alive

use crate::core::{HandoffError, HandoffResult};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 起動済みロールのハンドル
///
/// ロールのカウンタは `join` の戻り値（レポート）としてのみ読める。
pub struct RoleHandle<R> {
    name: String,
    handle: JoinHandle<R>,
    done: mpsc::Receiver<()>,
}

impl<R: Send + 'static> RoleHandle<R> {
    /// 名前付きOSスレッドでロールを起動
    pub(crate) fn spawn<F>(name: String, body: F) -> HandoffResult<Self>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let (done_tx, done) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let report = body();
                // 受信側が既に無い場合は通知不要
                let _ = done_tx.send(());
                report
            })
            .map_err(|e| HandoffError::spawn(name.as_str(), e))?;

        Ok(Self { name, handle, done })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }

    /// 最大 `timeout` だけ終了を待つ。終了していれば `true`
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.handle.is_finished() {
            return true;
        }
        match self.done.recv_timeout(timeout) {
            // パニック時は送信側がドロップされて Disconnected になる
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// 終了を待ってレポートを受け取る
    pub fn join(self) -> HandoffResult<R> {
        let Self { name, handle, .. } = self;
        handle.join().map_err(|_| HandoffError::role_panicked(name))
    }
}

/// パニックによる巻き戻り中にだけ `action` を実行するガード
///
/// ロールが異常終了しても、同じキューで待機している他のロールを起こすために使う。
pub(crate) struct OnPanic<F: FnOnce()> {
    action: Option<F>,
}

impl<F: FnOnce()> OnPanic<F> {
    pub(crate) fn new(action: F) -> Self {
        Self {
            action: Some(action),
        }
    }
}

impl<F: FnOnce()> Drop for OnPanic<F> {
    fn drop(&mut self) {
        if thread::panicking() {
            if let Some(action) = self.action.take() {
                action();
            }
        }
    }
}
