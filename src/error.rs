use thiserror::Error;
use tile_quant::QuantizeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Image encode error: {0}")]
    Encode(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Indexed output needs {entries} palette entries (max 256)")]
    PaletteTooLarge { entries: usize },

    #[error("Quantization error: {0}")]
    Quantize(#[from] QuantizeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<png::DecodingError> for AppError {
    fn from(e: png::DecodingError) -> Self {
        AppError::Decode(e.to_string())
    }
}

impl From<png::EncodingError> for AppError {
    fn from(e: png::EncodingError) -> Self {
        AppError::Encode(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_decode() {
        let error = AppError::Decode("Invalid signature".to_string());
        assert_eq!(error.to_string(), "Image decode error: Invalid signature");
    }

    #[test]
    fn test_app_error_palette_too_large() {
        let error = AppError::PaletteTooLarge { entries: 512 };
        assert_eq!(
            error.to_string(),
            "Indexed output needs 512 palette entries (max 256)"
        );
    }

    #[test]
    fn test_app_error_unsupported_format() {
        let error = AppError::UnsupportedFormat("gif".to_string());
        assert_eq!(error.to_string(), "Unsupported output format: gif");
    }

    #[test]
    fn test_app_error_from_quantize_error() {
        let error: AppError = QuantizeError::NoEligiblePixels.into();
        match error {
            AppError::Quantize(_) => {}
            _ => panic!("Expected Quantize variant"),
        }
    }

    #[test]
    fn test_app_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let error: AppError = yaml_error.into();
        assert!(error.to_string().starts_with("Config error: "));
    }

    #[test]
    fn test_app_error_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AppError = io.into();
        assert_eq!(error.to_string(), "IO error: missing");
    }
}
