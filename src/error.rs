//! エラー型の定義
//!
//! 分類パイプラインの各段階ごとに型付きのエラーを提供します。
//! どのエラーも既定の予測に置き換えず、呼び出し側（UI）へそのまま返します。

use std::path::PathBuf;

use thiserror::Error;

/// モデル読み込みエラー
///
/// 起動時に一度だけ発生し、分類機能全体を使用不可にします。
#[derive(Error, Debug)]
pub enum ModelLoadError {
    /// モデルファイルが存在しない
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    /// モデルファイルを開けない・読めない
    #[error("Failed to read model file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 推論ランタイムが解釈できない形式
    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    /// 入出力の形状・クラス構成がラベル表と一致しない
    #[error("Incompatible model schema: {0}")]
    IncompatibleSchema(String),
}

/// 前処理エラー（1回の呼び出しに限定）
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// 幅または高さが0の画像
    #[error("Image has zero dimension: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// 画像ファイルのデコード失敗
    #[error("Failed to decode image {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// 推論エラー（1回の呼び出しに限定、モデルハンドルは有効なまま）
#[derive(Error, Debug)]
pub enum InferenceError {
    /// 入力テンソルの要素数が期待と異なる
    #[error("Input tensor has {actual} values, expected {expected}")]
    InputShape { expected: usize, actual: usize },

    /// 出力ベクトルの長さが期待と異なる
    #[error("Output vector has {actual} scores, expected {expected}")]
    OutputShape { expected: usize, actual: usize },

    /// エンジン内部のエラー（エンジンのパニックを含む）
    #[error("Inference engine failed: {0}")]
    Engine(String),
}

/// ラベル参照エラー
///
/// 固定長の出力とラベル表では本来起こり得ないため、論理的な不具合を示します。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LabelLookupError {
    #[error("Class index {index} is out of range for a table of {len} labels")]
    OutOfRange { index: usize, len: usize },

    #[error("Score vector is empty")]
    EmptyScores,
}

/// 分類呼び出し全体のエラー
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    LabelLookup(#[from] LabelLookupError),

    /// モデルが読み込まれていない
    #[error("Classifier is not loaded")]
    NotLoaded,

    /// 別の分類リクエストが実行中
    #[error("A classification request is already in flight")]
    Busy,

    /// バックグラウンドタスクの異常終了
    #[error("Classification task failed: {0}")]
    Task(String),
}

impl ClassifyError {
    /// 画像の選び直し・撮り直しで回復できるエラーか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClassifyError::Preprocess(_) | ClassifyError::Inference(_) | ClassifyError::Busy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelLoadError::NotFound(PathBuf::from("assets/plant_disease_model.onnx"));
        assert!(format!("{}", err).contains("plant_disease_model.onnx"));

        let err = LabelLookupError::OutOfRange { index: 40, len: 38 };
        assert_eq!(
            format!("{}", err),
            "Class index 40 is out of range for a table of 38 labels"
        );
    }

    #[test]
    fn test_classify_error_conversion() {
        let err: ClassifyError = InferenceError::Engine("boom".to_string()).into();
        assert!(matches!(err, ClassifyError::Inference(_)));
        assert_eq!(format!("{}", err), "Inference engine failed: boom");
    }

    #[test]
    fn test_retryable() {
        assert!(ClassifyError::from(PreprocessError::EmptyImage { width: 0, height: 3 }).is_retryable());
        assert!(ClassifyError::from(InferenceError::OutputShape { expected: 38, actual: 1 }).is_retryable());
        assert!(!ClassifyError::from(LabelLookupError::EmptyScores).is_retryable());
        assert!(!ClassifyError::NotLoaded.is_retryable());
    }
}
