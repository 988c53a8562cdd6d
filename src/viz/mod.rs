pub mod chart;
pub mod map;

pub use chart::{render_svg, Bar, ChartLayout, ChartPoint};
pub use map::{compute_markers, compute_viewport, located_issues, CanvasBounds, Marker, Viewport};
