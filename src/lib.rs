//! 植物の葉の病害分類
//!
//! 事前学習済みモデルで葉の写真を38クラスに分類し、病名・原因・対処法を返します。
//!
//! ```no_run
//! use leaf_doctor::{Classifier, ClassifierConfig};
//!
//! let classifier = Classifier::load(&ClassifierConfig::default())?;
//! let image = image::open("leaf.jpg")?;
//! println!("{}", classifier.classify_text(&image)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod logging;
pub mod ml;
pub mod model;

mod classifier;
mod host;

pub use classifier::Classifier;
pub use error::{ClassifyError, InferenceError, LabelLookupError, ModelLoadError, PreprocessError};
pub use host::ClassifierHost;
pub use ml::{Diagnosis, Locale};
pub use model::{ClassifierConfig, ModelSource};
