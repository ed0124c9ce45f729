use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::classify::{HeaderSet, HormoneRecord};
use crate::config::ChartConfig;
use crate::layout::split_image;
use crate::utils::{join_fragments, recognize_region, OcrEngine, RecognizedFragment};

/// Raster formats picked up when a directory is given
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Everything recovered from one chart image
#[derive(Debug, Clone, Serialize)]
pub struct ChartExtraction {
    pub fragments: Vec<RecognizedFragment>,
    pub full_text: String,
    pub record: HormoneRecord,
}

/// Grid split, per-region OCR and section classification for one chart layout.
pub struct ChartExtractor<E: OcrEngine> {
    engine: E,
    config: ChartConfig,
    headers: HeaderSet,
}

impl<E: OcrEngine> ChartExtractor<E> {
    pub fn new(engine: E, config: ChartConfig) -> Result<Self> {
        config.validate().context("Invalid chart configuration")?;
        let headers = HeaderSet::new(config.headers.iter().cloned())?;

        Ok(Self {
            engine,
            config,
            headers,
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Run the pipeline over an in-memory image. Regions are recognized in
    /// row-major order; the first OCR failure aborts the run.
    pub fn extract_image(&self, image: &DynamicImage) -> Result<ChartExtraction> {
        self.extract_image_with(image, |_, _| {})
    }

    /// Like [`extract_image`](Self::extract_image), calling `on_fragment` with
    /// the 1-based region number as soon as each region is recognized.
    pub fn extract_image_with<F>(
        &self,
        image: &DynamicImage,
        mut on_fragment: F,
    ) -> Result<ChartExtraction>
    where
        F: FnMut(usize, &RecognizedFragment),
    {
        let grid = &self.config.grid;
        let patches = split_image(image, grid.rows, grid.cols);
        let (width, height) = image.dimensions();
        info!("Split {}x{} image into {} regions", width, height, patches.len());

        let mut fragments = Vec::with_capacity(patches.len());
        for (idx, (region, patch)) in patches.iter().enumerate() {
            info!("OCR processing region {}/{} {}", idx + 1, patches.len(), region);
            let fragment = recognize_region(&self.engine, *region, patch)
                .with_context(|| format!("OCR failed for region {} {}", idx + 1, region))?;
            on_fragment(idx + 1, &fragment);
            fragments.push(fragment);
        }

        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let full_text = join_fragments(&texts);
        let record = self.headers.categorize(&full_text);

        info!(
            "Categorized {} of {} headers",
            record.matched().count(),
            record.len()
        );

        Ok(ChartExtraction {
            fragments,
            full_text,
            record,
        })
    }

    /// Load an image from disk and run the pipeline over it.
    pub fn extract_path(&self, path: &Path) -> Result<ChartExtraction> {
        self.extract_path_with(path, |_, _| {})
    }

    pub fn extract_path_with<F>(&self, path: &Path, on_fragment: F) -> Result<ChartExtraction>
    where
        F: FnMut(usize, &RecognizedFragment),
    {
        info!("Loading image: {:?}", path);
        let image =
            image::open(path).with_context(|| format!("Failed to open image: {:?}", path))?;
        self.extract_image_with(&image, on_fragment)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Find image files under `dir`, sorted by path.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    images.sort();
    info!("Found {} image files in {:?}", images.len(), dir);

    Ok(images)
}
