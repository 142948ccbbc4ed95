//! テスト用の極小 ONNX モデル
//!
//! `[1, 128, 128, 3]` の入力をチャンネルごとに平均し（ReduceMean）、
//! 固定の `[3, 38]` 行列を掛けて `[1, 38]` を出力します。
//! 重みは `W[0][k] = k`、`W[1][k] = 0`、`W[2][k] = 1` なので、
//! 一様な色 (r, g, b) の入力に対するスコアは `r * k + b` になります。

use crate::ml::labels::NUM_CLASSES;
use crate::ml::preprocess::{CHANNELS, INPUT_SIZE};

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

// onnx.proto の定数
const ELEM_FLOAT: u64 = 1;
const ATTR_INT: u64 = 2;
const ATTR_INTS: u64 = 7;

/// protobuf メッセージの書き出し
#[derive(Default)]
struct Message(Vec<u8>);

impl Message {
    fn varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.0.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.0.push(value as u8);
    }

    fn key(&mut self, field: u64, wire: u64) {
        self.varint(field << 3 | wire);
    }

    fn int(mut self, field: u64, value: u64) -> Self {
        self.key(field, WIRE_VARINT);
        self.varint(value);
        self
    }

    fn bytes(mut self, field: u64, value: &[u8]) -> Self {
        self.key(field, WIRE_LEN);
        self.varint(value.len() as u64);
        self.0.extend_from_slice(value);
        self
    }

    fn string(self, field: u64, value: &str) -> Self {
        self.bytes(field, value.as_bytes())
    }

    fn message(self, field: u64, value: Message) -> Self {
        self.bytes(field, &value.0)
    }
}

/// float テンソル型の ValueInfoProto
fn float_value_info(name: &str, dims: &[u64]) -> Message {
    let shape = dims.iter().fold(Message::default(), |shape, &dim| {
        shape.message(1, Message::default().int(1, dim))
    });
    let tensor_type = Message::default().int(1, ELEM_FLOAT).message(2, shape);
    Message::default()
        .string(1, name)
        .message(2, Message::default().message(1, tensor_type))
}

/// `[3, 38]` の重み
pub(crate) fn tiny_model_weights() -> Vec<f32> {
    let mut weights = vec![0.0; CHANNELS * NUM_CLASSES];
    for k in 0..NUM_CLASSES {
        weights[k] = k as f32;
        weights[2 * NUM_CLASSES + k] = 1.0;
    }
    weights
}

/// モデルのバイト列を生成
pub(crate) fn tiny_onnx_model() -> Vec<u8> {
    let size = INPUT_SIZE as u64;
    let channels = CHANNELS as u64;
    let classes = NUM_CLASSES as u64;

    let raw: Vec<u8> = tiny_model_weights()
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();
    let weights = Message::default()
        .int(1, channels)
        .int(1, classes)
        .int(2, ELEM_FLOAT)
        .string(8, "W")
        .bytes(9, &raw);

    let axes = Message::default()
        .string(1, "axes")
        .int(8, 1)
        .int(8, 2)
        .int(20, ATTR_INTS);
    let keepdims = Message::default()
        .string(1, "keepdims")
        .int(3, 0)
        .int(20, ATTR_INT);
    let mean = Message::default()
        .string(1, "X")
        .string(2, "mean")
        .string(3, "channel_mean")
        .string(4, "ReduceMean")
        .message(5, axes)
        .message(5, keepdims);
    let matmul = Message::default()
        .string(1, "mean")
        .string(1, "W")
        .string(2, "Y")
        .string(3, "scores")
        .string(4, "MatMul");

    let graph = Message::default()
        .message(1, mean)
        .message(1, matmul)
        .string(2, "tiny_leaf")
        .message(5, weights)
        .message(11, float_value_info("X", &[1, size, size, channels]))
        .message(12, float_value_info("Y", &[1, classes]));

    let opset = Message::default().string(1, "").int(2, 13);
    Message::default()
        .int(1, 7)
        .message(7, graph)
        .message(8, opset)
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_encoding() {
        let mut message = Message::default();
        message.varint(300);
        assert_eq!(message.0, vec![0xac, 0x02]);
        assert_eq!(Message::default().int(1, 7).0, vec![0x08, 0x07]);
    }

    #[test]
    fn test_weights_layout() {
        let weights = tiny_model_weights();
        assert_eq!(weights.len(), 3 * 38);
        assert_eq!(weights[37], 37.0);
        assert_eq!(weights[38 + 5], 0.0);
        assert_eq!(weights[2 * 38 + 5], 1.0);
    }
}
