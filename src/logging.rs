//! ログ初期化
//!
//! ライブラリ内部は `tracing` でログを出します。ホストアプリ側で購読者を用意しない場合は
//! `init_logging` で標準エラー出力向けの購読者を登録できます。

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// ログ設定
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// モジュールパスを表示するか
    pub include_target: bool,
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            include_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// 文字列のログレベルから作成（不明な値は INFO）
    pub fn from_level_str(level: &str) -> Self {
        let level = match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        Self {
            level,
            ..Self::default()
        }
    }
}

/// グローバルな購読者を登録
///
/// 設定ファイルのログレベルは `ClassifierConfig::log_config` で変換できます。
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to initialize logging")
}
