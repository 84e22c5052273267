// 結果レポート機能
// join後のカウンタと宛先内容を人間向け・JSONで出力する

pub mod implementations;

pub use implementations::RunReport;
