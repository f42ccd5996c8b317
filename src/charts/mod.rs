//! Charts module - static chart rendering

mod figure;
mod renderer;

pub use figure::{category_color, reds_palette, value_range, ChartError, Figure, PALETTE};
pub use renderer::StaticChartRenderer;
