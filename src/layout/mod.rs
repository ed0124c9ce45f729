mod grid;

pub use grid::{grid_regions, split_image, Region};
