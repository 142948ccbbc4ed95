//! 葉の画像分類パイプライン
//!
//! 前処理 → 推論 → ラベル解決を1回の同期呼び出しで行います。
//! モデルハンドルはこの構造体が排他的に所有し、推論呼び出しはミューテックスで直列化します。
//! 呼び出しはブロッキングなので、UI側は操作スレッド以外で実行してください。

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;

use crate::error::{ClassifyError, InferenceError, ModelLoadError};
use crate::ml::inference::{InferenceBackend, ModelHandle, OutputVector};
use crate::ml::labels::LabelTable;
use crate::ml::postprocess::{resolve, Diagnosis, Locale};
use crate::ml::preprocess::{load_image, preprocess};
use crate::model::config::ClassifierConfig;
use crate::model::model_storage::{load_model, ModelSource};

/// 分類器
pub struct Classifier {
    handle: Mutex<ModelHandle>,
    labels: LabelTable,
    locale: Locale,
}

impl Classifier {
    /// 設定に従ってモデルを読み込み、分類器を初期化
    pub fn load(config: &ClassifierConfig) -> Result<Self, ModelLoadError> {
        Self::from_source(&config.model_source(), config.locale)
    }

    /// 指定した読み込み元から組み込みラベル表で初期化
    pub fn from_source(source: &ModelSource, locale: Locale) -> Result<Self, ModelLoadError> {
        let labels = LabelTable::builtin();
        let handle = load_model(source, &labels)?;
        Self::from_handle(handle, labels, locale)
    }

    /// 任意の推論エンジンで初期化
    pub fn with_backend(
        backend: Box<dyn InferenceBackend + Send>,
        labels: LabelTable,
        locale: Locale,
    ) -> Result<Self, ModelLoadError> {
        Self::from_handle(ModelHandle::new(backend, "custom backend"), labels, locale)
    }

    /// ラベル表とモデル出力幅を照合してから分類器を作成
    pub fn from_handle(
        handle: ModelHandle,
        labels: LabelTable,
        locale: Locale,
    ) -> Result<Self, ModelLoadError> {
        if let Some(width) = handle.output_width() {
            labels
                .validate(width)
                .map_err(ModelLoadError::IncompatibleSchema)?;
        }

        Ok(Self {
            handle: Mutex::new(handle),
            labels,
            locale,
        })
    }

    /// 推論のみを実行（直列化される）
    pub fn infer(&self, image: &DynamicImage) -> Result<OutputVector, ClassifyError> {
        let input = preprocess(image)?;

        let output = {
            // エンジン内部のパニックで毒化しても、ハンドル自体は次の呼び出しで再利用する
            let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
            catch_unwind(AssertUnwindSafe(|| handle.infer(&input))).map_err(|_| {
                tracing::error!("Inference engine panicked");
                InferenceError::Engine("inference engine panicked".to_string())
            })??
        };

        if output.len() != self.labels.len() {
            return Err(InferenceError::OutputShape {
                expected: self.labels.len(),
                actual: output.len(),
            }
            .into());
        }
        tracing::debug!("Probabilities: {:?}", output.as_slice());
        Ok(output)
    }

    /// 画像を分類して診断結果を返す
    pub fn classify(&self, image: &DynamicImage) -> Result<Diagnosis, ClassifyError> {
        let output = self.infer(image)?;
        let mut diagnosis = resolve(&output, &self.labels, self.locale)?;
        diagnosis.classified_at = Some(chrono::Local::now().to_rfc3339());
        tracing::info!(
            class = diagnosis.class_index,
            key = diagnosis.key,
            "Predicted: {} (probability: {})",
            diagnosis.disease,
            diagnosis.score
        );
        Ok(diagnosis)
    }

    /// 画像を分類して整形済みの診断テキストを返す
    pub fn classify_text(&self, image: &DynamicImage) -> Result<String, ClassifyError> {
        Ok(self.classify(image)?.text)
    }

    /// 画像ファイルを読み込んで分類
    pub fn classify_path<P: AsRef<Path>>(&self, path: P) -> Result<Diagnosis, ClassifyError> {
        let image = load_image(path.as_ref())?;
        self.classify(&image)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("labels", &self.labels.len())
            .field("locale", &self.locale)
            .finish()
    }
}
