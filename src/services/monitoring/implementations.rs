// 進捗監視の具象実装

use crate::core::ProgressReporter;
use std::io::{self, Write};

/// コンソール出力による進捗報告実装
///
/// 1行ごとに標準出力のロックを取るので、複数スレッドの出力が混ざらない。
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn line(&self, message: std::fmt::Arguments<'_>) {
        if self.quiet {
            return;
        }
        let mut out = io::stdout().lock();
        // 出力先が閉じられていても処理は続ける
        let _ = writeln!(out, "{message}");
        let _ = out.flush();
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_produced(&self, role: &str, item: &str) {
        self.line(format_args!("[{role}] Produced: {item}"));
    }

    fn report_consumed(&self, role: &str, item: &str) {
        self.line(format_args!("[{role}] Consumed: {item}"));
    }

    fn report_finished(&self, role: &str, count: usize) {
        self.line(format_args!("[{role}] Finished: {count} items"));
    }

    fn report_error(&self, role: &str, error: &str) {
        if !self.quiet {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "[{role}] Error: {error}");
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NoOpProgressReporter {
    fn report_produced(&self, _role: &str, _item: &str) {}

    fn report_consumed(&self, _role: &str, _item: &str) {}

    fn report_finished(&self, _role: &str, _count: usize) {}

    fn report_error(&self, _role: &str, _error: &str) {}
}
