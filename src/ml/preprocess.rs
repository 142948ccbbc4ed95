//! 画像の前処理
//!
//! 任意サイズの画像を 128x128 に変形し、モデル入力用の float 配列へ変換します。
//! 学習時と同じく画素値は 0〜255 のまま使用し、正規化は行いません。

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};

use crate::error::PreprocessError;

/// モデル入力の一辺（ピクセル）
pub const INPUT_SIZE: u32 = 128;

/// チャンネル数（RGB）
pub const CHANNELS: usize = 3;

/// モデル入力テンソル [128, 128, 3]（HWC、RGB順）
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
}

impl InputTensor {
    /// 要素数（128 * 128 * 3）
    pub const LEN: usize = (INPUT_SIZE as usize) * (INPUT_SIZE as usize) * CHANNELS;

    /// 形状 [高さ, 幅, チャンネル]
    pub const fn shape() -> [usize; 3] {
        [INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// ネイティブバイトオーダーの生バイト列
    ///
    /// 入力バッファを生バイトで受け取るランタイム向け。
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    /// 既存の float 配列から作成（テスト・他ランタイム連携用）
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self { data }
    }
}

/// 画像をモデル入力へ変換
///
/// 1. 縦横比を保たずに 128x128 へバイリニア補間でリサイズ
/// 2. 行優先で各画素の R, G, B を読み出し（アルファは破棄）
/// 3. R,G,B,R,G,B,... の順で 0〜255 の float として格納
pub fn preprocess(image: &DynamicImage) -> Result<InputTensor, PreprocessError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }

    let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    tracing::debug!(
        "Resized {}x{} image to {}x{}",
        width,
        height,
        INPUT_SIZE,
        INPUT_SIZE
    );

    let rgb = resized.to_rgb8();
    if let Some(first) = rgb.pixels().next() {
        tracing::debug!(
            r = first[0],
            g = first[1],
            b = first[2],
            "First raw pixel"
        );
    }

    let mut data = Vec::with_capacity(InputTensor::LEN);
    for pixel in rgb.pixels() {
        data.push(pixel[0] as f32);
        data.push(pixel[1] as f32);
        data.push(pixel[2] as f32);
    }
    tracing::debug!("Input tensor size: {} floats", data.len());

    Ok(InputTensor { data })
}

/// 画像ファイルを読み込んでデコード
pub fn load_image(path: &Path) -> Result<DynamicImage, PreprocessError> {
    image::open(path).map_err(|e| PreprocessError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
