//! 分類器の設定管理モジュール
//!
//! モデルの配置場所や表示言語などをJSON形式で保存・読み込みします。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;
use crate::ml::postprocess::Locale;
use crate::model::model_storage::{ModelSource, DEFAULT_MODEL_FILE};

/// モデル設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSettings {
    /// 同梱アセットのディレクトリ
    pub asset_dir: String,
    /// モデルファイル名
    pub file_name: String,
    /// メタデータ付きパッケージのパス（指定時はこちらを優先）
    #[serde(default)]
    pub package: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            asset_dir: "assets".to_string(),
            file_name: DEFAULT_MODEL_FILE.to_string(),
            package: None,
        }
    }
}

/// 分類器の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// モデル設定
    pub model: ModelSettings,
    /// 診断テキストの見出し言語
    #[serde(default)]
    pub locale: Locale,
    /// ログレベル（"trace" / "debug" / "info" / "warn" / "error"）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            locale: Locale::default(),
            log_level: default_log_level(),
        }
    }
}

impl ClassifierConfig {
    /// 設定ファイルのデフォルトパス
    pub fn default_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    /// 設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ClassifierConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// 設定を読み込む、存在しないか壊れている場合はデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults: {}", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config ({:#}), using defaults", e);
                Self::default()
            }
        }
    }

    /// 設定を保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// `log_level` に対応するログ設定
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_level_str(&self.log_level)
    }

    /// モデルの読み込み元
    pub fn model_source(&self) -> ModelSource {
        match &self.model.package {
            Some(package) => ModelSource::Package(PathBuf::from(package)),
            None => ModelSource::asset(&self.model.asset_dir, &self.model.file_name),
        }
    }
}
