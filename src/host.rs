//! 非同期UI向けの分類ホスト
//!
//! 読み込み済みの分類器を保持し、分類を `spawn_blocking` で操作スレッド外に逃がします。
//! 実行中に次のリクエストが来た場合は `ClassifyError::Busy` を返します。
//! モデルの読み込みに失敗している間はすべてのリクエストが `ClassifyError::NotLoaded` になります。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use image::DynamicImage;

use crate::classifier::Classifier;
use crate::error::{ClassifyError, ModelLoadError};
use crate::ml::postprocess::Diagnosis;
use crate::model::config::ClassifierConfig;

/// 実行中フラグを処理終了時に戻すガード
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 分類ホスト
#[derive(Clone, Default)]
pub struct ClassifierHost {
    classifier: Arc<RwLock<Option<Arc<Classifier>>>>,
    in_flight: Arc<AtomicBool>,
}

impl ClassifierHost {
    /// 分類器なしで作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定に従ってモデルを（再）読み込み
    ///
    /// 失敗した場合は以前の分類器も破棄し、再読み込みが成功するまで分類できません。
    pub fn load(&self, config: &ClassifierConfig) -> Result<(), ModelLoadError> {
        match Classifier::load(config) {
            Ok(classifier) => {
                self.install(classifier);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Model load failed, classification disabled: {}", e);
                self.unload();
                Err(e)
            }
        }
    }

    /// 構築済みの分類器を設定
    pub fn install(&self, classifier: Classifier) {
        let mut slot = self.classifier.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(classifier));
    }

    /// 分類器を破棄
    pub fn unload(&self) {
        let mut slot = self.classifier.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// 分類可能な状態か
    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    /// 分類を実行中か（UIのボタン無効化用）
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn current(&self) -> Option<Arc<Classifier>> {
        self.classifier
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 画像を別スレッドで分類
    pub async fn classify(&self, image: DynamicImage) -> Result<Diagnosis, ClassifyError> {
        let classifier = self.current().ok_or(ClassifyError::NotLoaded)?;
        let guard = InFlight::acquire(&self.in_flight).ok_or(ClassifyError::Busy)?;

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            classifier.classify(&image)
        })
        .await
        .map_err(|e| ClassifyError::Task(e.to_string()))?
    }

    /// 画像を別スレッドで分類し、診断テキストを返す
    pub async fn classify_text(&self, image: DynamicImage) -> Result<String, ClassifyError> {
        Ok(self.classify(image).await?.text)
    }
}
