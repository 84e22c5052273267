// キュー層 - スレッド間受け渡し用の同期プリミティブ

pub mod bounded;

pub use bounded::BoundedQueue;
