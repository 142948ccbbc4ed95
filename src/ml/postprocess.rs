//! 推論結果の後処理
//!
//! スコアベクトルから最大スコアのクラスを選び、ラベル表を引いて診断テキストを組み立てます。
//! 信頼度によるしきい値処理は行わず、最大スコアのクラスを常に報告します。

use serde::{Deserialize, Serialize};

use crate::error::LabelLookupError;
use crate::ml::inference::OutputVector;
use crate::ml::labels::LabelTable;

/// 表示言語
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Locale {
    /// ベンガル語（ラベル表の言語）
    #[default]
    #[serde(rename = "bn")]
    Bengali,
    /// 英語
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn headers(&self) -> SectionHeaders {
        match self {
            Locale::Bengali => SectionHeaders {
                disease: "রোগ:",
                cause: "কেন হয়:",
                treatment: "প্রতিকার:",
            },
            Locale::English => SectionHeaders {
                disease: "Disease:",
                cause: "Cause:",
                treatment: "Treatment:",
            },
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Bengali => write!(f, "bn"),
            Locale::English => write!(f, "en"),
        }
    }
}

/// 各セクションの見出し
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeaders {
    pub disease: &'static str,
    pub cause: &'static str,
    pub treatment: &'static str,
}

/// セクション間の区切り
pub const SECTION_SEPARATOR: &str = "\n\n";

/// 診断結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    /// 選ばれたクラスインデックス
    pub class_index: usize,
    /// データセットのクラス名
    pub key: &'static str,
    pub disease: &'static str,
    pub cause: &'static str,
    pub treatment: &'static str,
    /// 最大スコア
    pub score: f32,
    /// 分類日時（RFC 3339、分類器が設定する）
    pub classified_at: Option<String>,
    /// UIに表示する整形済みテキスト
    pub text: String,
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// 最大スコアのインデックスと値
///
/// 先頭から走査し、厳密に大きい値のときだけ更新するため、同点は小さいインデックスが勝ちます。
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = scores.split_first()?;
    let mut best = (0, first);
    for (i, &score) in rest.iter().enumerate() {
        if score > best.1 {
            best = (i + 1, score);
        }
    }
    Some(best)
}

/// 見出し付きの1セクション（本文が空なら見出しのみ）
fn section(header: &str, body: &str) -> String {
    if body.is_empty() {
        header.to_string()
    } else {
        format!("{} {}", header, body)
    }
}

/// 3セクションの診断テキストを組み立て
pub fn format_diagnosis(
    headers: &SectionHeaders,
    disease: &str,
    cause: &str,
    treatment: &str,
) -> String {
    [
        section(headers.disease, disease),
        section(headers.cause, cause),
        section(headers.treatment, treatment),
    ]
    .join(SECTION_SEPARATOR)
}

/// スコアベクトルを診断結果に変換
///
/// 同じスコアと同じラベル表からは常に同じ結果を返します（日時は付与しない）。
pub fn resolve(
    output: &OutputVector,
    table: &LabelTable,
    locale: Locale,
) -> Result<Diagnosis, LabelLookupError> {
    let (class_index, score) = argmax(output.as_slice()).ok_or(LabelLookupError::EmptyScores)?;
    let label = table.get(class_index)?;

    let text = format_diagnosis(&locale.headers(), label.disease, label.cause, label.treatment);

    Ok(Diagnosis {
        class_index,
        key: label.key,
        disease: label.disease,
        cause: label.cause,
        treatment: label.treatment,
        score,
        classified_at: None,
        text,
    })
}
