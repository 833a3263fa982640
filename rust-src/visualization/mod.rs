//! Visualization layer for terminal and image output.

mod export;
mod format;
mod terminal;

#[allow(unused_imports)]
pub use export::{export_heatmap, generate_svg, open_file, CELL_GAP, CELL_SIZE};
#[allow(unused_imports)]
pub use terminal::{render_grid, render_terminal, LEVEL_GLYPHS, PADDING_GLYPH};
