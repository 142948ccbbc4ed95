//! モデルの読み込み
//!
//! 同梱アセットのモデルファイルを読み取り専用でメモリマップし、推論エンジンを構築します。
//! メタデータ付きの tar.gz パッケージからの読み込みにも対応します。
//!
//! パッケージ構成（tar.gz内部）:
//! - metadata.json   - メタデータ（クラス名、入力サイズなど）
//! - model.onnx      - モデル本体

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;
use tar::{Archive, Builder};

use crate::error::ModelLoadError;
use crate::ml::inference::{ModelBytes, ModelHandle, TractEngine};
use crate::ml::labels::LabelTable;
use crate::model::model_metadata::ModelMetadata;

/// 同梱モデルの既定ファイル名
pub const DEFAULT_MODEL_FILE: &str = "plant_disease_model.onnx";

const METADATA_ENTRY: &str = "metadata.json";
const MODEL_ENTRY: &str = "model.onnx";

/// モデルの読み込み元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// メモリマップで読み込むモデルファイル
    Mapped(PathBuf),
    /// メタデータ付き tar.gz パッケージ
    Package(PathBuf),
}

impl ModelSource {
    /// アセットディレクトリ内の名前付きモデル
    pub fn asset(asset_dir: impl AsRef<Path>, file_name: &str) -> Self {
        ModelSource::Mapped(asset_dir.as_ref().join(file_name))
    }

    /// アセットディレクトリ内の既定モデル
    pub fn bundled(asset_dir: impl AsRef<Path>) -> Self {
        Self::asset(asset_dir, DEFAULT_MODEL_FILE)
    }

    pub fn path(&self) -> &Path {
        match self {
            ModelSource::Mapped(path) | ModelSource::Package(path) => path,
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Mapped(path) => write!(f, "{}", path.display()),
            ModelSource::Package(path) => write!(f, "package {}", path.display()),
        }
    }
}

fn open_file(path: &Path) -> Result<File, ModelLoadError> {
    File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ModelLoadError::NotFound(path.to_path_buf()),
        _ => ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// モデルファイルを読み取り専用でメモリマップ
pub fn map_model_file(path: &Path) -> Result<Mmap, ModelLoadError> {
    let file = open_file(path)?;
    // SAFETY: 読み取り専用のマップで、同梱アセットは実行中に書き換えられない
    unsafe { Mmap::map(&file) }.map_err(|source| ModelLoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// パッケージからメタデータとモデル本体を読み込む
pub fn read_package(path: &Path) -> Result<(ModelMetadata, Vec<u8>), ModelLoadError> {
    let file = open_file(path)?;
    let unreadable = |source: std::io::Error| ModelLoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut archive = Archive::new(GzDecoder::new(file));
    let mut metadata_opt: Option<ModelMetadata> = None;
    let mut model_opt: Option<Vec<u8>> = None;

    for entry in archive.entries().map_err(unreadable)? {
        let mut entry = entry.map_err(unreadable)?;
        let entry_path = entry.path().map_err(unreadable)?.to_path_buf();

        match entry_path.to_str() {
            Some(METADATA_ENTRY) => {
                let mut json_str = String::new();
                entry.read_to_string(&mut json_str).map_err(unreadable)?;
                let metadata = ModelMetadata::from_json_string(&json_str)
                    .map_err(|e| ModelLoadError::InvalidFormat(format!("{:#}", e)))?;
                metadata_opt = Some(metadata);
            }
            Some(MODEL_ENTRY) => {
                let mut buffer = Vec::new();
                entry.read_to_end(&mut buffer).map_err(unreadable)?;
                model_opt = Some(buffer);
            }
            _ => {}
        }
    }

    match (metadata_opt, model_opt) {
        (Some(metadata), Some(model)) => Ok((metadata, model)),
        (None, _) => Err(ModelLoadError::InvalidFormat(format!(
            "{} not found in package",
            METADATA_ENTRY
        ))),
        (_, None) => Err(ModelLoadError::InvalidFormat(format!(
            "{} not found in package",
            MODEL_ENTRY
        ))),
    }
}

/// メタデータと共にモデルを tar.gz パッケージとして保存
pub fn save_model_package(
    output_path: &Path,
    metadata: &ModelMetadata,
    model_bytes: &[u8],
) -> anyhow::Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
    }

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create package file: {:?}", output_path))?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

    let json_str = metadata.to_json_string()?;
    for (name, bytes) in [(METADATA_ENTRY, json_str.as_bytes()), (MODEL_ENTRY, model_bytes)] {
        let mut header = tar::Header::new_gnu();
        header.set_path(name)?;
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append(&header, bytes)
            .with_context(|| format!("Failed to add {} to package", name))?;
    }

    builder
        .into_inner()
        .context("Failed to finalize package")?
        .finish()
        .context("Failed to finish gzip stream")?;
    Ok(())
}

/// モデルを読み込んで推論可能なハンドルを作成
///
/// 失敗した場合は分類機能全体が使用できないため、呼び出し側は機能を無効化してください。
pub fn load_model(source: &ModelSource, table: &LabelTable) -> Result<ModelHandle, ModelLoadError> {
    tracing::debug!("Loading model: {}", source);

    let bytes = match source {
        ModelSource::Mapped(path) => ModelBytes::Mapped(map_model_file(path)?),
        ModelSource::Package(path) => {
            let (metadata, model) = read_package(path)?;
            metadata.check_compatible(table)?;
            tracing::debug!(
                num_classes = metadata.num_classes,
                exported_at = %metadata.exported_at,
                "Model package metadata"
            );
            ModelBytes::Owned(model)
        }
    };

    let engine = TractEngine::from_bytes(bytes)?;
    let handle = ModelHandle::new(Box::new(engine), source.to_string());
    tracing::info!(
        "Model loaded: {} (output width {:?})",
        source,
        handle.output_width()
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_model::tiny_onnx_model;

    #[test]
    fn test_open_file_error_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.onnx");
        assert!(matches!(open_file(&missing), Err(ModelLoadError::NotFound(p)) if p == missing));
        assert!(matches!(
            read_package(&missing),
            Err(ModelLoadError::NotFound(_))
        ));

        // ディレクトリはマップできない
        assert!(matches!(
            map_model_file(dir.path()),
            Err(ModelLoadError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_load_mapped_onnx_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILE);
        std::fs::write(&path, tiny_onnx_model()).unwrap();

        let handle = load_model(&ModelSource::bundled(dir.path()), &LabelTable::builtin()).unwrap();
        assert_eq!(handle.output_width(), Some(38));
        assert_eq!(handle.description(), path.display().to_string());
    }

    #[test]
    fn test_load_packaged_onnx_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.tar.gz");
        let metadata = ModelMetadata::for_table(&LabelTable::builtin());
        save_model_package(&path, &metadata, &tiny_onnx_model()).unwrap();

        let handle = load_model(&ModelSource::Package(path), &LabelTable::builtin()).unwrap();
        assert_eq!(handle.output_width(), Some(38));
    }

    #[test]
    fn test_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let source = ModelSource::bundled(dir.path());
        assert_eq!(source.path(), dir.path().join("plant_disease_model.onnx"));

        let err = load_model(&source, &LabelTable::builtin()).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_asset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILE);
        std::fs::write(&path, b"definitely not a model").unwrap();

        let mmap = map_model_file(&path).unwrap();
        assert_eq!(&mmap[..], b"definitely not a model");

        let err = load_model(&ModelSource::Mapped(path), &LabelTable::builtin()).unwrap_err();
        assert!(matches!(err, ModelLoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_package_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models/plant_disease_model.tar.gz");
        let metadata = ModelMetadata::for_table(&LabelTable::builtin());

        save_model_package(&path, &metadata, b"onnx-bytes").unwrap();
        let (loaded, model) = read_package(&path).unwrap();
        assert_eq!(loaded, metadata);
        assert_eq!(model, b"onnx-bytes");
    }

    #[test]
    fn test_incompatible_package_rejected_before_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.tar.gz");
        let mut metadata = ModelMetadata::for_table(&LabelTable::builtin());
        metadata.num_classes = 39;
        metadata.class_keys.push("Sweet_Potato_Healthy".to_string());
        save_model_package(&path, &metadata, b"onnx-bytes").unwrap();

        let err = load_model(&ModelSource::Package(path), &LabelTable::builtin()).unwrap_err();
        assert!(matches!(err, ModelLoadError::IncompatibleSchema(_)));
    }

    #[test]
    fn test_package_with_corrupt_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.tar.gz");
        let metadata = ModelMetadata::for_table(&LabelTable::builtin());
        save_model_package(&path, &metadata, b"garbage").unwrap();

        let err = load_model(&ModelSource::Package(path), &LabelTable::builtin()).unwrap_err();
        assert!(matches!(err, ModelLoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_not_a_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.tar.gz");
        std::fs::write(&path, b"plain text").unwrap();

        let err = read_package(&path).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::Unreadable { .. } | ModelLoadError::InvalidFormat(_)
        ));
    }
}
