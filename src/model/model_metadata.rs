//! モデルメタデータの定義
//!
//! モデルパッケージ（tar.gz）に同梱される `metadata.json` の内容です。
//! 読み込み時にラベル表と照合し、クラス構成のずれを起動時に検出します。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;
use crate::ml::labels::LabelTable;
use crate::ml::preprocess::INPUT_SIZE;

/// モデルメタデータ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    /// クラス名（出力インデックス順）
    /// 例: ["Apple___Apple_scab", "Apple___Black_rot", ...]
    #[serde(default)]
    pub class_keys: Vec<String>,

    /// 出力クラス数
    pub num_classes: usize,

    /// モデル入力サイズ（正方形、通常128）
    pub model_input_size: u32,

    /// エクスポート日時（ISO8601形式）
    #[serde(default)]
    pub exported_at: String,
}

impl ModelMetadata {
    /// ラベル表から対応するメタデータを作成
    pub fn for_table(table: &LabelTable) -> Self {
        Self {
            class_keys: table.keys().map(str::to_string).collect(),
            num_classes: table.len(),
            model_input_size: INPUT_SIZE,
            exported_at: chrono::Local::now().to_rfc3339(),
        }
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }

    /// ラベル表・入力サイズとの整合性を検証
    pub fn check_compatible(&self, table: &LabelTable) -> Result<(), ModelLoadError> {
        if self.model_input_size != INPUT_SIZE {
            return Err(ModelLoadError::IncompatibleSchema(format!(
                "model expects {}x{} input, classifier produces {}x{}",
                self.model_input_size, self.model_input_size, INPUT_SIZE, INPUT_SIZE
            )));
        }

        table
            .validate(self.num_classes)
            .map_err(ModelLoadError::IncompatibleSchema)?;

        if self.class_keys.is_empty() {
            return Ok(());
        }
        if self.class_keys.len() != table.len() {
            return Err(ModelLoadError::IncompatibleSchema(format!(
                "metadata lists {} class keys, label table has {}",
                self.class_keys.len(),
                table.len()
            )));
        }
        for (index, (expected, actual)) in table.keys().zip(&self.class_keys).enumerate() {
            if expected != actual {
                return Err(ModelLoadError::IncompatibleSchema(format!(
                    "class {} is '{}' in the model but '{}' in the label table",
                    index, actual, expected
                )));
            }
        }
        Ok(())
    }
}
