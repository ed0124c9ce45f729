use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Gland headers printed on the reference chart, in chart order.
pub const GLAND_HEADERS: [&str; 13] = [
    "Hypothalamus",
    "Thyroid and Parathyroid",
    "Liver",
    "Adrenal",
    "Kidney",
    "Testes",
    "Pineal Gland",
    "Pituitary gland",
    "Thymus",
    "Stomach",
    "Pancreas",
    "Ovary/Placenta",
    "Uterus",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 4, cols: 2 }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            anyhow::bail!("grid.rows must be > 0");
        }
        if self.cols == 0 {
            anyhow::bail!("grid.cols must be > 0");
        }
        Ok(())
    }

    pub fn region_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable, looked up on PATH unless absolute
    pub binary: String,
    pub lang: String,
    /// Page segmentation mode (`--psm`)
    pub psm: Option<u8>,
    pub dpi: Option<u32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            lang: "eng".to_string(),
            psm: None,
            dpi: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub grid: GridConfig,
    pub headers: Vec<String>,
    pub ocr: OcrConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            headers: GLAND_HEADERS.iter().map(|h| h.to_string()).collect(),
            ocr: OcrConfig::default(),
        }
    }
}

impl ChartConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: ChartConfig = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;

        if self.headers.is_empty() {
            anyhow::bail!("headers must not be empty");
        }

        let mut seen = HashSet::new();
        for header in &self.headers {
            if header.trim().is_empty() {
                anyhow::bail!("headers must not contain blank entries");
            }
            if header.trim() != header {
                anyhow::bail!("header has surrounding whitespace: {:?}", header);
            }
            if !seen.insert(header.as_str()) {
                anyhow::bail!("duplicate header: {:?}", header);
            }
        }

        if self.ocr.lang.trim().is_empty() {
            anyhow::bail!("ocr.lang must not be empty");
        }

        Ok(())
    }
}

impl fmt::Display for ChartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid={}x{} headers={} lang={}",
            self.grid.rows,
            self.grid.cols,
            self.headers.len(),
            self.ocr.lang
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_matches_chart_layout() {
        let config = ChartConfig::default();
        assert_eq!(config.grid.rows, 4);
        assert_eq!(config.grid.cols, 2);
        assert_eq!(config.grid.region_count(), 8);
        assert_eq!(config.headers.len(), 13);
        assert_eq!(config.headers[0], "Hypothalamus");
        assert_eq!(config.headers[12], "Uterus");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"{{"grid": {{"rows": 3}}, "ocr": {{"psm": 6}}}}"#).unwrap();

        let config = ChartConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.grid.rows, 3);
        assert_eq!(config.grid.cols, 2);
        assert_eq!(config.ocr.psm, Some(6));
        assert_eq!(config.ocr.binary, "tesseract");
        assert_eq!(config.headers.len(), 13);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ChartConfig::load(Path::new("/nonexistent/chart.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ChartConfig::default();
        config.grid.cols = 0;
        assert!(config.validate().is_err());

        let mut config = ChartConfig::default();
        config.headers.push("Liver".to_string());
        assert!(config.validate().is_err());

        let mut config = ChartConfig::default();
        config.headers = vec![" ".to_string()];
        assert!(config.validate().is_err());

        let mut config = ChartConfig::default();
        config.headers = vec!["Liver".to_string(), "Kidney ".to_string()];
        assert!(config.validate().is_err());

        let mut config = ChartConfig::default();
        config.headers.clear();
        assert!(config.validate().is_err());
    }
}
