use serde::Serialize;

use crate::models::IssuesByTime;

/// A labelled value to chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl From<&IssuesByTime> for ChartPoint {
    fn from(item: &IssuesByTime) -> Self {
        ChartPoint::new(item.date.clone(), item.count as f64)
    }
}

/// Geometry for one bar, in view units with y growing downward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub view_width: f64,
    pub view_height: f64,
    pub bar_width: f64,
    pub spacing: f64,
    /// Tallest bar as a fraction of `view_height`.
    pub max_bar_height_fraction: f64,
    /// Baseline position as a fraction of `view_height`; labels sit below it.
    pub baseline_fraction: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            view_width: 400.0,
            view_height: 200.0,
            bar_width: 80.0,
            spacing: 10.0,
            max_bar_height_fraction: 0.7,
            baseline_fraction: 0.8,
        }
    }
}

impl ChartLayout {
    pub fn baseline(&self) -> f64 {
        self.view_height * self.baseline_fraction
    }

    pub fn max_bar_height(&self) -> f64 {
        self.view_height * self.max_bar_height_fraction
    }

    /// Lays bars out left to right in input order, scaled so the largest
    /// value reaches `max_bar_height`. The scale never drops below 1, so
    /// empty and all-zero data are safe.
    pub fn scale(&self, points: &[ChartPoint]) -> Vec<Bar> {
        let max = points.iter().map(|p| p.value).fold(1.0_f64, f64::max);
        let baseline = self.baseline();
        let max_height = self.max_bar_height();

        points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let height = point.value / max * max_height;
                Bar {
                    x: self.spacing + i as f64 * (self.bar_width + self.spacing),
                    y: baseline - height,
                    width: self.bar_width,
                    height,
                    label: point.label.clone(),
                    value: point.value,
                }
            })
            .collect()
    }

    /// Width needed to show every bar without clipping.
    pub fn content_width(&self, bar_count: usize) -> f64 {
        self.spacing + bar_count as f64 * (self.bar_width + self.spacing)
    }
}

pub fn scale(points: &[ChartPoint], layout: &ChartLayout) -> Vec<Bar> {
    layout.scale(points)
}

/// Renders bars as a standalone SVG document.
pub fn render_svg(bars: &[Bar], layout: &ChartLayout) -> String {
    let width = layout.view_width.max(layout.content_width(bars.len()));
    let label_y = layout.baseline() + 16.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="{h}" viewBox="0 0 {w} {h}" preserveAspectRatio="none">"#,
        w = width,
        h = layout.view_height
    );
    svg.push('\n');

    for bar in bars {
        let center = bar.x + bar.width / 2.0;
        svg.push_str(&format!(
            "  <g>\n    <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#3b82f6\" />\n",
            bar.x, bar.y, bar.width, bar.height
        ));
        svg.push_str(&format!(
            "    <text x=\"{}\" y=\"{}\" font-size=\"12\" text-anchor=\"middle\">{}</text>\n",
            center,
            label_y,
            escape_xml(&bar.label)
        ));
        svg.push_str(&format!(
            "    <text x=\"{}\" y=\"{}\" font-size=\"12\" text-anchor=\"middle\">{}</text>\n  </g>\n",
            center,
            bar.y - 6.0,
            bar.value
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[(&str, f64)]) -> Vec<ChartPoint> {
        values.iter().map(|(l, v)| ChartPoint::new(*l, *v)).collect()
    }

    #[test]
    fn test_empty_input_gives_no_bars() {
        assert!(ChartLayout::default().scale(&[]).is_empty());
    }

    #[test]
    fn test_single_zero_value_is_flat_bar() {
        let bars = ChartLayout::default().scale(&points(&[("A", 0.0)]));
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].height, 0.0);
        assert_eq!(bars[0].y, 160.0);
    }

    #[test]
    fn test_scaling_and_positions() {
        let layout = ChartLayout::default();
        let bars = layout.scale(&points(&[
            ("Potholes", 45.0),
            ("Streetlight", 20.0),
            ("Sanitation", 30.0),
            ("Other", 15.0),
        ]));

        assert_eq!(bars[0].height, 140.0);
        assert_eq!(bars[0].y, 20.0);
        assert!((bars[2].height - 30.0 / 45.0 * 140.0).abs() < 1e-9);

        let xs: Vec<f64> = bars.iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![10.0, 100.0, 190.0, 280.0]);

        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Potholes", "Streetlight", "Sanitation", "Other"]);
        assert!(bars.iter().all(|b| (b.y + b.height - 160.0).abs() < 1e-9));
    }

    #[test]
    fn test_values_below_one_use_unit_scale() {
        let bars = ChartLayout::default().scale(&points(&[("a", 0.5)]));
        assert_eq!(bars[0].height, 70.0);
    }

    #[test]
    fn test_svg_contains_each_bar() {
        let layout = ChartLayout::default();
        let bars = layout.scale(&points(&[("2024-05-01", 3.0), ("<b>", 1.0)]));
        let svg = render_svg(&bars, &layout);
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("2024-05-01"));
        assert!(svg.contains("&lt;b&gt;"));
    }
}
