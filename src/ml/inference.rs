//! モデル推論機能

use std::ops::Deref;

use memmap2::Mmap;
use tract_onnx::prelude::*;

use crate::error::{InferenceError, ModelLoadError};
use crate::ml::preprocess::{InputTensor, INPUT_SIZE};

/// モデル出力（クラスごとのスコア）
#[derive(Debug, Clone, PartialEq)]
pub struct OutputVector {
    scores: Vec<f32>,
}

impl OutputVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl From<Vec<f32>> for OutputVector {
    fn from(scores: Vec<f32>) -> Self {
        Self::new(scores)
    }
}

/// 推論エンジンの抽象
///
/// `[128, 128, 3] f32 -> [N] f32` の呼び出し契約のみを前提とします。
pub trait InferenceBackend {
    /// 1枚分の入力で推論を実行
    fn run(&mut self, input: &InputTensor) -> Result<OutputVector, InferenceError>;

    /// 出力ベクトルの幅（モデルから判明する場合）
    fn output_width(&self) -> Option<usize>;
}

/// モデルのバイト列（メモリマップまたはメモリ上のコピー）
pub enum ModelBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for ModelBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ModelBytes::Mapped(mmap) => mmap,
            ModelBytes::Owned(bytes) => bytes,
        }
    }
}

/// tract による ONNX 推論エンジン
pub struct TractEngine {
    plan: TypedSimplePlan<TypedModel>,
    output_width: Option<usize>,
    // マッピングはエンジンと同じ寿命で保持する
    _bytes: ModelBytes,
}

impl TractEngine {
    /// モデルのバイト列から推論プランを構築
    pub fn from_bytes(bytes: ModelBytes) -> Result<Self, ModelLoadError> {
        let size = INPUT_SIZE as usize;
        let mut reader = std::io::Cursor::new(&bytes[..]);

        let model = tract_onnx::onnx()
            .model_for_read(&mut reader)
            .map_err(|e| ModelLoadError::InvalidFormat(format!("{:#}", e)))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, 3)),
            )
            .map_err(|e| ModelLoadError::IncompatibleSchema(format!("{:#}", e)))?
            .into_optimized()
            .map_err(|e| ModelLoadError::IncompatibleSchema(format!("{:#}", e)))?;

        // [1, N] の出力から N を取り出す
        let output_width = model
            .output_fact(0)
            .ok()
            .and_then(|fact| fact.shape.as_concrete().map(|dims| dims.iter().product()));

        let plan = model
            .into_runnable()
            .map_err(|e| ModelLoadError::InvalidFormat(format!("{:#}", e)))?;

        Ok(Self {
            plan,
            output_width,
            _bytes: bytes,
        })
    }
}

impl InferenceBackend for TractEngine {
    fn run(&mut self, input: &InputTensor) -> Result<OutputVector, InferenceError> {
        let size = INPUT_SIZE as usize;
        let tensor = Tensor::from_shape(&[1, size, size, 3], input.as_slice())
            .map_err(|e| InferenceError::Engine(format!("{:#}", e)))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::Engine(format!("{:#}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Engine("model produced no outputs".to_string()))?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Engine(format!("{:#}", e)))?
            .iter()
            .copied()
            .collect::<Vec<f32>>();

        Ok(OutputVector::new(scores))
    }

    fn output_width(&self) -> Option<usize> {
        self.output_width
    }
}

/// 読み込み済みモデルのハンドル
///
/// 分類パイプラインが排他的に所有し、破棄時にエンジンとマッピングを解放します。
pub struct ModelHandle {
    engine: Box<dyn InferenceBackend + Send>,
    description: String,
}

impl ModelHandle {
    pub fn new(engine: Box<dyn InferenceBackend + Send>, description: impl Into<String>) -> Self {
        Self {
            engine,
            description: description.into(),
        }
    }

    /// 推論を実行（同期・ブロッキング）
    pub fn infer(&mut self, input: &InputTensor) -> Result<OutputVector, InferenceError> {
        if input.len() != InputTensor::LEN {
            return Err(InferenceError::InputShape {
                expected: InputTensor::LEN,
                actual: input.len(),
            });
        }
        self.engine.run(input)
    }

    pub fn output_width(&self) -> Option<usize> {
        self.engine.output_width()
    }

    /// 読み込み元の説明（ログ用）
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("description", &self.description)
            .field("output_width", &self.output_width())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_model::tiny_onnx_model;
    use approx::assert_relative_eq;

    struct EchoBackend;

    impl InferenceBackend for EchoBackend {
        fn run(&mut self, input: &InputTensor) -> Result<OutputVector, InferenceError> {
            Ok(OutputVector::new(vec![input.as_slice()[0]; 4]))
        }

        fn output_width(&self) -> Option<usize> {
            Some(4)
        }
    }

    #[test]
    fn test_handle_rejects_wrong_input_length() {
        let mut handle = ModelHandle::new(Box::new(EchoBackend), "echo");
        let err = handle.infer(&InputTensor::from_vec(vec![0.0; 10])).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InputShape { expected, actual: 10 } if expected == 128 * 128 * 3
        ));
    }

    #[test]
    fn test_handle_runs_backend() {
        let mut handle = ModelHandle::new(Box::new(EchoBackend), "echo");
        let output = handle
            .infer(&InputTensor::from_vec(vec![7.0; InputTensor::LEN]))
            .unwrap();
        assert_eq!(output.as_slice(), &[7.0, 7.0, 7.0, 7.0]);
        assert_eq!(handle.output_width(), Some(4));
        assert_eq!(handle.description(), "echo");
    }

    #[test]
    fn test_tract_engine_runs_onnx_graph() {
        let mut engine = TractEngine::from_bytes(ModelBytes::Owned(tiny_onnx_model())).unwrap();
        assert_eq!(engine.output_width(), Some(38));

        // 一様な色 (2, 7, 9)
        let data: Vec<f32> = (0..InputTensor::LEN)
            .map(|i| [2.0, 7.0, 9.0][i % 3])
            .collect();
        let output = engine.run(&InputTensor::from_vec(data)).unwrap();

        assert_eq!(output.len(), 38);
        for (k, &score) in output.as_slice().iter().enumerate() {
            assert_relative_eq!(score, 2.0 * k as f32 + 9.0, epsilon = 1e-3);
        }

        // 同じプランで2回目も実行できる
        let output = engine
            .run(&InputTensor::from_vec(vec![0.0; InputTensor::LEN]))
            .unwrap();
        assert!(output.as_slice().iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn test_tract_rejects_garbage() {
        let result = TractEngine::from_bytes(ModelBytes::Owned(b"not an onnx model".to_vec()));
        assert!(matches!(result, Err(ModelLoadError::InvalidFormat(_))));
    }
}
