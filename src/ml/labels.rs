//! 病害ラベル表
//!
//! モデル出力のインデックスと1対1で対応する38クラスのラベルを定義します。
//! 並び順は学習時のクラス順と一致している必要があり、モデルを再学習しない限り
//! 並べ替えてはいけません。

use serde::Serialize;

use crate::error::LabelLookupError;

/// クラス数（モデル出力の幅）
pub const NUM_CLASSES: usize = 38;

/// 1クラス分のラベル
///
/// `key` は学習データセットのクラス名、残りは表示用のローカライズ済みテキストです。
/// 健康なクラスでは `cause` が空文字列になることがあります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiseaseLabel {
    pub key: &'static str,
    pub disease: &'static str,
    pub cause: &'static str,
    pub treatment: &'static str,
}

impl DiseaseLabel {
    pub const fn new(
        key: &'static str,
        disease: &'static str,
        cause: &'static str,
        treatment: &'static str,
    ) -> Self {
        Self {
            key,
            disease,
            cause,
            treatment,
        }
    }
}

/// 組み込みラベル（ベンガル語）
pub static LABELS: [DiseaseLabel; NUM_CLASSES] = [
    // 0
    DiseaseLabel::new(
        "Apple___Apple_scab",
        "আপেল স্ক্যাব",
        "আর্দ্র আবহাওয়া ও অতিরিক্ত পানির কারণে ছত্রাক জন্মায়।",
        "আক্রান্ত পাতা ছেঁটে ফেলুন এবং কপার ছত্রাকনাশক স্প্রে করুন। নিয়মিত ছাঁটাই ও পানি নিষ্কাশনের ব্যবস্থা নিন।",
    ),
    // 1
    DiseaseLabel::new(
        "Apple___Black_rot",
        "আপেল ব্ল্যাক রট",
        "পচা ফল বা পুরনো ডালে ছত্রাক জন্ম নিয়ে ছড়ায়।",
        "পচা ফল ও ডাল কেটে ফেলুন এবং ছত্রাকনাশক ব্যবহার করুন। গাছের নিচে পড়ে থাকা ফল নিয়মিত পরিষ্কার করুন।",
    ),
    // 2
    DiseaseLabel::new(
        "Apple___Cedar_apple_rust",
        "সিডার আপেল রস্ট",
        "আপেল গাছের কাছে সিডার গাছ থাকলে ছত্রাক ছড়ায়।",
        "সিডার গাছ সরান এবং ছত্রাকনাশক ব্যবহার করুন। কাছাকাছি সিডার গাছ না রাখলে রোগ হবে না।",
    ),
    // 3
    DiseaseLabel::new(
        "Apple___healthy",
        "আপেল___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি এবং আলো ও সার দেওয়া উচিত।",
    ),
    // 4
    DiseaseLabel::new(
        "Blueberry___healthy",
        "ব্লুবেরি___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি এবং আলো ও সার দেওয়া উচিত।",
    ),
    // 5
    DiseaseLabel::new(
        "Cherry_(including_sour)___Powdery_mildew",
        "চেরি পাউডারি মিলডিউ",
        "শুষ্ক আবহাওয়ায় পাতায় ছত্রাকের স্তর জমে।",
        "সালফার স্প্রে দিন এবং বাতাস চলাচলের ব্যবস্থা রাখুন। গাছ খুব ঘন না হলে রোগ কম হয়।",
    ),
    // 6
    DiseaseLabel::new(
        "Cherry_(including_sour)___healthy",
        "চেরি (টকসহ)___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি এবং আলো ও সার দেওয়া উচিত।",
    ),
    // 7
    DiseaseLabel::new(
        "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
        "ভুট্টা সারকোসপোরা পাতা দাগ",
        "গরম ও আর্দ্র আবহাওয়া।",
        "পাতা ছেঁটে ফেলুন এবং ছত্রাকনাশক স্প্রে করুন। সঠিক পানি সরবরাহ নিশ্চিত করুন।",
    ),
    // 8
    DiseaseLabel::new(
        "Corn_(maize)___Common_rust_",
        "ভুট্টা কমন রস্ট",
        "আর্দ্র ও ঠাণ্ডা আবহাওয়ায় ছত্রাকের বীজ ছড়ায়।",
        "রোগমুক্ত জাত লাগান এবং ছত্রাকনাশক ব্যবহার করুন। জমিতে আগের রোগমুক্ত ফসল চাষে সাহায্য পাবে।",
    ),
    // 9
    DiseaseLabel::new(
        "Corn_(maize)___Northern_Leaf_Blight",
        "ভুট্টা নর্দার্ন পাতা ব্লাইট",
        "আর্দ্র আবহাওয়া ও দীর্ঘ সময় বৃষ্টির কারণে ছত্রাক আক্রমণ।",
        "গাছের ঘনত্ব কমিয়ে দিন এবং রোগমুক্ত জাত ব্যবহার করুন।",
    ),
    // 10
    DiseaseLabel::new(
        "Corn_(maize)___healthy",
        "ভুট্টা___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি এবং আলো ও সার দেওয়া উচিত।",
    ),
    // 11
    DiseaseLabel::new(
        "Grape___Black_rot",
        "আঙ্গুর ব্ল্যাক রট",
        "আর্দ্র আবহাওয়া ও পচা ফল থেকে ছত্রাক ছড়ায়।",
        "আক্রান্ত ফল ও ডাল কেটে ফেলুন এবং ছত্রাকনাশক ব্যবহার করুন।",
    ),
    // 12
    DiseaseLabel::new(
        "Grape___Esca_(Black_Measles)",
        "আঙ্গুর এসকা (ব্ল্যাক মিজলস)",
        "অতিরিক্ত আর্দ্রতা ও দীর্ঘকালীন উচ্চ তাপমাত্রা।",
        "আক্রান্ত লতা সরিয়ে ফেলুন এবং ছত্রাকনাশক স্প্রে করুন।",
    ),
    // 13
    DiseaseLabel::new(
        "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
        "আঙ্গুর পাতা ব্লাইট (আইসারিওপসিস পাতা দাগ)",
        "বৃষ্টি ও আর্দ্রতার কারণে ছত্রাক ছড়ায়।",
        "গাছের ডাল ছেঁটে ফেলুন এবং ছত্রাকনাশক স্প্রে করুন।",
    ),
    // 14
    DiseaseLabel::new(
        "Grape___healthy",
        "আঙ্গুর___সুস্থ --- (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 15
    DiseaseLabel::new(
        "Orange___Haunglongbing_(Citrus_greening)",
        "কমলা হুয়াংলংবিং (সাইট্রাস গ্রিনিং)",
        "সাদা মাছি দ্বারা ভাইরাস সংক্রমণ।",
        "সাদা মাছি নিয়ন্ত্রণ করুন এবং আক্রান্ত গাছ সরান।",
    ),
    // 16
    DiseaseLabel::new(
        "Peach___Bacterial_spot",
        "পিচ ব্যাকটেরিয়াল স্পট",
        "আর্দ্র আবহাওয়া ও উচ্চ তাপমাত্রা।",
        "তামা ভিত্তিক ছত্রাকনাশক ব্যবহার করুন। আক্রান্ত গাছ সরান।",
    ),
    // 17
    DiseaseLabel::new(
        "Peach___healthy",
        "পিচ___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি এবং আলো ও সার দেওয়া উচিত।",
    ),
    // 18
    DiseaseLabel::new(
        "Pepper,_bell___Bacterial_spot",
        "বেল মরিচ ব্যাকটেরিয়াল স্পট",
        "শীতল ও আর্দ্র আবহাওয়া।",
        "বেল মরিচের ডাল ও পাতা ছেঁটে ফেলুন এবং কপার স্প্রে ব্যবহার করুন।",
    ),
    // 19
    DiseaseLabel::new(
        "Pepper,_bell___healthy",
        "বেল মরিচ___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 20
    DiseaseLabel::new(
        "Potato___Early_blight",
        "আলু আর্লি ব্লাইট",
        "শীতল ও আর্দ্র আবহাওয়া।",
        "অস্তিত্বশীল আলু জাত ব্যবহার করুন এবং সঠিক সার ও পানি ব্যবহার করুন।",
    ),
    // 21
    DiseaseLabel::new(
        "Potato___Late_blight",
        "আলু লেট ব্লাইট",
        "ঠাণ্ডা ও আর্দ্র পরিবেশে ছত্রাকের বৃদ্ধি।",
        "ছত্রাকনাশক স্প্রে করুন এবং জমিতে আগের রোগমুক্ত ফসল চাষ করুন।",
    ),
    // 22
    DiseaseLabel::new(
        "Potato___healthy",
        "আলু___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 23
    DiseaseLabel::new(
        "Raspberry___healthy",
        "রাস্পবেরি___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 24
    DiseaseLabel::new(
        "Soybean___healthy",
        "সয়াবিন___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 25
    DiseaseLabel::new(
        "Squash___Powdery_mildew",
        "স্কোয়াশ পাউডারি মিলডিউ",
        "আর্দ্র আবহাওয়া ও কম বাতাস চলাচল।",
        "সালফার স্প্রে দিন বাতাস চলাচলের ব্যবস্থা রাখুন।",
    ),
    // 26
    DiseaseLabel::new(
        "Strawberry___Leaf_scorch",
        "স্ট্রবেরি পাতার স্কর্চ",
        "গরম ও আর্দ্র আবহাওয়া।",
        "পাতা ছেঁটে ফেলুন এবং ছত্রাকনাশক স্প্রে করুন।",
    ),
    // 27
    DiseaseLabel::new(
        "Strawberry___healthy",
        "স্ট্রবেরি___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 28
    DiseaseLabel::new(
        "Tomato___Bacterial_spot",
        "টমেটো ব্যাকটেরিয়াল স্পট",
        "অতিরিক্ত আর্দ্রতা ও সঠিক পরিচর্যার অভাব।",
        "কপার ছত্রাকনাশক স্প্রে করুন।",
    ),
    // 29
    DiseaseLabel::new(
        "Sweet_Potato_Healthy",
        "মিষ্টি আলু সুস্থ (গাছটি সুস্থ! 🌱)",
        "---",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
    // 30
    DiseaseLabel::new(
        "Tomato___Late_blight",
        "টমেটো লেট ব্লাইট",
        "গরম ও আর্দ্র আবহাওয়া।",
        "রোগমুক্ত জাত ব্যবহার করুন এবং ছত্রাকনাশক স্প্রে করুন।",
    ),
    // 31
    DiseaseLabel::new(
        "Tomato___Leaf_Mold",
        "টমেটো পাতার ছাঁচ",
        "ঠাণ্ডা ও আর্দ্র আবহাওয়া।",
        "আক্রান্ত অংশ ছেঁটে ফেলুন এবং ছত্রাকনাশক প্রয়োগ করুন।",
    ),
    // 32
    DiseaseLabel::new(
        "Tomato___Septoria_leaf_spot",
        "টমেটো সেপ্টোরিয়া দাগ",
        "আর্দ্র আবহাওয়া।",
        "আক্রান্ত অংশ কেটে ফেলুন এবং ছত্রাকনাশক ব্যবহার করুন।",
    ),
    // 33
    DiseaseLabel::new(
        "Tomato___Spider_mites Two-spotted_spider_mite",
        "টমেটো স্পাইডার মাইট",
        "গরম ও শুকনো আবহাওয়া।",
        "নিম তেল স্প্রে করুন এবং পোকা নিয়ন্ত্রণ করুন।",
    ),
    // 34
    DiseaseLabel::new(
        "Tomato___Target_Spot",
        "টমেটো টার্গেট স্পট",
        "গরম ও আর্দ্র আবহাওয়া।",
        "ছত্রাকনাশক স্প্রে এবং রোগমুক্ত জাত ব্যবহার করুন।",
    ),
    // 35
    DiseaseLabel::new(
        "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
        "টমেটো ইয়েলো লিফ কার্ল ভাইরাস",
        "সাদা মাছি দ্বারা ভাইরাস ছড়ায়।",
        "সাদা মাছি নিয়ন্ত্রণ করুন এবং আক্রান্ত গাছ সরান।",
    ),
    // 36
    DiseaseLabel::new(
        "Tomato___Tomato_mosaic_virus",
        "টমেটো মোজাইক ভাইরাস",
        "ভাইরাস দ্বারা সংক্রমণ।",
        "রোগমুক্ত বীজ ব্যবহার করুন এবং গাছ ও পোকা নিয়ন্ত্রণ করুন।",
    ),
    // 37
    DiseaseLabel::new(
        "Tomato___healthy",
        "টমেটো___সুস্থ (গাছটি সুস্থ! 🌱)",
        "",
        "গাছকে সুস্থ রাখতে নিয়মিত পানি আলো ও সার দেওয়া উচিত।",
    ),
];

/// クラスインデックスからラベルへの不変な対応表
#[derive(Debug, Clone, Copy)]
pub struct LabelTable {
    rows: &'static [DiseaseLabel],
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LabelTable {
    /// 組み込みの38クラス表
    pub fn builtin() -> Self {
        Self { rows: &LABELS }
    }

    /// 任意の静的な表から作成
    pub fn new(rows: &'static [DiseaseLabel]) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// インデックスからラベルを取得
    pub fn get(&self, index: usize) -> Result<&'static DiseaseLabel, LabelLookupError> {
        self.rows.get(index).ok_or(LabelLookupError::OutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    /// データセットのクラス名からインデックスを取得（最初に一致したもの）
    pub fn position(&self, key: &str) -> Option<usize> {
        self.rows.iter().position(|label| label.key == key)
    }

    /// クラス名の一覧（インデックス順）
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rows.iter().map(|label| label.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static DiseaseLabel> {
        self.rows.iter()
    }

    /// 表の長さがモデルの出力幅と一致するか検証
    pub fn validate(&self, output_width: usize) -> Result<(), String> {
        if self.rows.len() != output_width {
            return Err(format!(
                "label table has {} rows but the model outputs {} scores",
                self.rows.len(),
                output_width
            ));
        }
        Ok(())
    }
}
