// CLI層 - コマンドライン引数の定義と処理
// ユーザーインターフェースとアプリケーションロジックの橋渡し

pub mod args;
pub mod commands;

// 公開API
pub use args::*;
pub use commands::*;

/// パース済みのサブコマンドを実行用オプションに変換
impl From<Commands> for RunOptions {
    fn from(command: Commands) -> Self {
        let Commands::Run {
            capacity,
            items,
            producers,
            consumers,
            timeout_ms,
            preset,
            config,
            quiet,
            json,
        } = command;

        Self {
            capacity,
            items,
            producers,
            consumers,
            timeout_ms,
            preset,
            config,
            quiet,
            json,
        }
    }
}
