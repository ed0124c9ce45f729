use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::io;
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::layout::Region;
use crate::utils::text_processor::normalize_whitespace;

/// Errors raised by an OCR backend
#[derive(Error, Debug)]
pub enum OcrError {
    /// Tesseract binary could not be started
    #[error(
        "Tesseract OCR is not installed or not in PATH ({binary}). \
         Please install Tesseract: https://github.com/tesseract-ocr/tesseract"
    )]
    NotInstalled { binary: String },

    #[error("I/O error during OCR: {0}")]
    Io(#[from] io::Error),

    /// Region could not be written as an image file for the engine
    #[error("Failed to encode region image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Tesseract exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("OCR output is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Anything that turns pixels into text.
pub trait OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

/// OCR through the `tesseract` command line tool.
///
/// Note: This requires Tesseract to be installed on the system.
/// Install:
/// - Linux: sudo apt-get install tesseract-ocr
/// - Mac: brew install tesseract
/// - Windows: https://github.com/UB-Mannheim/tesseract/wiki
#[derive(Debug, Clone)]
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Check that the configured binary can be executed
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn command_args(&self) -> Vec<String> {
        let mut args = vec!["-l".to_string(), self.config.lang.clone()];
        if let Some(psm) = self.config.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        if let Some(dpi) = self.config.dpi {
            args.push("--dpi".to_string());
            args.push(dpi.to_string());
        }
        args
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        // Removed on drop
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("region.png");
        image.save_with_format(&input, ImageFormat::Png)?;

        let output = Command::new(&self.config.binary)
            .arg(&input)
            .arg("stdout")
            .args(self.command_args())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => OcrError::NotInstalled {
                    binary: self.config.binary.clone(),
                },
                _ => OcrError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Tesseract failed: {}", stderr);
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let text = String::from_utf8(output.stdout)?;
        debug!("Tesseract returned {} characters", text.len());
        Ok(text)
    }
}

/// Text recognized in one grid region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognizedFragment {
    pub region: Region,
    /// Engine output as returned
    pub raw: String,
    pub text: String,
}

/// Run `engine` over one region and normalize its output.
pub fn recognize_region<E: OcrEngine>(
    engine: &E,
    region: Region,
    patch: &DynamicImage,
) -> Result<RecognizedFragment, OcrError> {
    let raw = engine.recognize(patch)?;
    debug!("Raw text for region {}: {:?}", region, raw);

    let text = normalize_whitespace(&raw);
    Ok(RecognizedFragment { region, raw, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine(&'static str);

    impl OcrEngine for FixedEngine {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_recognize_region_keeps_raw_text() {
        let region = Region {
            left: 0,
            top: 0,
            right: 4,
            bottom: 4,
        };
        let patch = DynamicImage::new_rgb8(4, 4);

        let engine = FixedEngine("Thymus\nThymosin\n\n");
        let fragment = recognize_region(&engine, region, &patch).unwrap();
        assert_eq!(fragment.raw, "Thymus\nThymosin\n\n");
        assert_eq!(fragment.text, "Thymus Thymosin ");
        assert_eq!(fragment.region, region);
    }

    #[test]
    fn test_command_args() {
        let engine = TesseractCli::new(OcrConfig {
            psm: Some(6),
            dpi: Some(300),
            ..OcrConfig::default()
        });
        assert_eq!(
            engine.command_args(),
            vec!["-l", "eng", "--psm", "6", "--dpi", "300"]
        );

        assert_eq!(TesseractCli::default().command_args(), vec!["-l", "eng"]);
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let engine = TesseractCli::new(OcrConfig {
            binary: "definitely-not-a-tesseract-binary".to_string(),
            ..OcrConfig::default()
        });
        assert!(!engine.is_available());

        let image = DynamicImage::new_rgb8(8, 8);
        let err = engine.recognize(&image).unwrap_err();
        assert!(matches!(err, OcrError::NotInstalled { .. }));
    }

    #[test]
    fn test_ocr_availability() {
        if TesseractCli::default().is_available() {
            println!("Tesseract is available");
        } else {
            println!("Tesseract is not installed");
        }
    }
}
