//! Yaesu clone-mode model definitions.
//!
//! A clone-mode radio is recognised by its image: the length of the
//! download and the model code in its first bytes.

use crate::layout::{IMAGE_SIZE, LABEL_LENGTH, MODEL_CODE};

/// Static model definition for a Yaesu clone-mode handheld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YaesuModel {
    /// Human-readable model name (e.g. "FT-1D").
    pub name: &'static str,
    /// Model code at offset 0 of the image.
    pub model_code: &'static [u8],
    /// Exact image length in bytes.
    pub image_size: usize,
    /// Baud rate of the clone cable.
    pub default_baud_rate: u32,
    pub name_length: usize,
}

impl YaesuModel {
    /// True if `image` is a complete image for this model.
    pub fn matches(&self, image: &[u8]) -> bool {
        image.len() == self.image_size && image.starts_with(self.model_code)
    }
}

/// Yaesu FT-1DR.
pub fn ft1d() -> YaesuModel {
    YaesuModel {
        name: "FT-1D",
        model_code: MODEL_CODE,
        image_size: IMAGE_SIZE,
        default_baud_rate: 38_400,
        name_length: LABEL_LENGTH,
    }
}

/// Every supported clone-mode model.
pub fn all_yaesu_models() -> Vec<YaesuModel> {
    vec![ft1d()]
}

/// The model whose image `data` is, if any.
pub fn model_for_image(data: &[u8]) -> Option<YaesuModel> {
    all_yaesu_models().into_iter().find(|m| m.matches(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Vec<u8> {
        let mut data = vec![0u8; IMAGE_SIZE];
        data[..5].copy_from_slice(b"AH44M");
        data
    }

    #[test]
    fn ft1d_definition() {
        let m = ft1d();
        assert_eq!(m.name, "FT-1D");
        assert_eq!(m.image_size, 130_507);
        assert_eq!(m.default_baud_rate, 38_400);
    }

    #[test]
    fn recognises_its_image() {
        assert_eq!(model_for_image(&image()), Some(ft1d()));
    }

    #[test]
    fn wrong_code_or_length() {
        let mut data = image();
        data[0] = b'X';
        assert!(model_for_image(&data).is_none());

        let mut data = image();
        data.pop();
        assert!(!ft1d().matches(&data));
    }
}
