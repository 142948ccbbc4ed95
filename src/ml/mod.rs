pub mod labels;
pub mod preprocess;
pub mod inference;
pub mod postprocess;
#[cfg(test)]
pub(crate) mod test_model;

pub use labels::{DiseaseLabel, LabelTable, LABELS, NUM_CLASSES};
pub use preprocess::{preprocess, load_image, InputTensor, INPUT_SIZE};
pub use inference::{InferenceBackend, ModelBytes, ModelHandle, OutputVector, TractEngine};
pub use postprocess::{argmax, format_diagnosis, resolve, Diagnosis, Locale, SectionHeaders};
