use crate::constants::{DEFAULT_CENTER, MAX_ZOOM, NEIGHBORHOOD_ZOOM, WORLD_ZOOM};
use crate::models::{Coordinate, Issue, IssueStatus};

/// Initial map position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Viewport {
    /// Shown when no issue has a usable location.
    pub fn world() -> Self {
        Self {
            center: Coordinate::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: WORLD_ZOOM,
        }
    }

    pub fn zoomed_in(self) -> Self {
        Self {
            zoom: (self.zoom + 1).min(MAX_ZOOM),
            ..self
        }
    }

    pub fn zoomed_out(self) -> Self {
        Self {
            zoom: self.zoom.saturating_sub(1),
            ..self
        }
    }

    pub fn centered_on(self, center: Coordinate) -> Self {
        Self { center, ..self }
    }

    /// Degrees visible around the center: `360 / 2^zoom` of longitude and
    /// half that of latitude.
    pub fn bounds(&self) -> CanvasBounds {
        let lng_span = 360.0 / 2f64.powi(self.zoom as i32);
        let lat_span = lng_span / 2.0;
        CanvasBounds {
            x: [self.center.lng - lng_span / 2.0, self.center.lng + lng_span / 2.0],
            y: [self.center.lat - lat_span / 2.0, self.center.lat + lat_span / 2.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    /// Longitude range.
    pub x: [f64; 2],
    /// Latitude range.
    pub y: [f64; 2],
}

impl CanvasBounds {
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.lng >= self.x[0]
            && coordinate.lng <= self.x[1]
            && coordinate.lat >= self.y[0]
            && coordinate.lat <= self.y[1]
    }
}

/// Everything needed to draw one issue and its popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub issue_id: String,
    pub coordinate: Coordinate,
    pub title: String,
    pub status: IssueStatus,
    pub detail_link: String,
}

/// Issues that have a parseable location, in input order.
pub fn located_issues(issues: &[Issue]) -> Vec<(&Issue, Coordinate)> {
    issues
        .iter()
        .filter_map(|issue| issue.coordinate().map(|c| (issue, c)))
        .collect()
}

/// Centers on the first located issue at neighborhood zoom, or shows the
/// whole world when nothing is located. The first issue wins on purpose; no
/// averaging.
pub fn compute_viewport(issues: &[Issue]) -> Viewport {
    match issues.iter().find_map(Issue::coordinate) {
        Some(center) => Viewport {
            center,
            zoom: NEIGHBORHOOD_ZOOM,
        },
        None => Viewport::world(),
    }
}

/// One marker per located issue; unlocated issues are skipped.
pub fn compute_markers(issues: &[Issue]) -> Vec<Marker> {
    located_issues(issues)
        .into_iter()
        .map(|(issue, coordinate)| Marker {
            issue_id: issue.id.clone(),
            coordinate,
            title: issue.title.clone(),
            status: issue.status.clone(),
            detail_link: issue.detail_link(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawLocation;
    use serde_json::json;

    fn issue_at(id: &str, location: Option<&str>) -> Issue {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Issue {}", id),
            "status": "assigned",
            "location": location,
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_list_is_world_view() {
        let viewport = compute_viewport(&[]);
        assert_eq!(viewport.center, Coordinate::new(20.0, 0.0));
        assert_eq!(viewport.zoom, 2);
    }

    #[test]
    fn test_first_located_issue_wins() {
        let issues = vec![issue_at("a", Some("12.9,77.6")), issue_at("b", Some("1,1"))];
        let viewport = compute_viewport(&issues);
        assert_eq!(viewport.center, Coordinate::new(12.9, 77.6));
        assert_eq!(viewport.zoom, 13);

        let reversed: Vec<Issue> = issues.into_iter().rev().collect();
        assert_eq!(compute_viewport(&reversed).center, Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn test_unlocated_issues_are_skipped() {
        let issues = vec![
            issue_at("none", None),
            issue_at("bad", Some("12.9")),
            issue_at("junk", Some("north,south")),
            issue_at("ok", Some("51.5,-0.12")),
        ];
        assert_eq!(compute_viewport(&issues).center, Coordinate::new(51.5, -0.12));

        let markers = compute_markers(&issues);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].issue_id, "ok");
        assert_eq!(markers[0].title, "Issue ok");
        assert_eq!(markers[0].status, IssueStatus::Assigned);
        assert_eq!(markers[0].detail_link, "/issues/ok");
    }

    #[test]
    fn test_only_unlocated_is_world_view() {
        let issues = vec![issue_at("a", None), issue_at("b", Some(""))];
        assert_eq!(compute_viewport(&issues), Viewport::world());
        assert!(compute_markers(&issues).is_empty());
    }

    #[test]
    fn test_point_locations_are_markers() {
        let mut issue = issue_at("p", None);
        issue.location = Some(RawLocation::Point {
            kind: Some("Point".to_string()),
            coordinates: vec![77.6, 12.9],
        });
        assert_eq!(compute_markers(&[issue])[0].coordinate, Coordinate::new(12.9, 77.6));
    }

    #[test]
    fn test_bounds_follow_zoom() {
        let world = Viewport::world().bounds();
        assert_eq!(world.x, [-45.0, 45.0]);
        assert_eq!(world.y, [-2.5, 42.5]);

        let zoomed = Viewport::world().zoomed_out().zoomed_out().bounds();
        assert_eq!(zoomed.x, [-180.0, 180.0]);
        assert!(zoomed.contains(Coordinate::new(20.0, 170.0)));

        assert_eq!(Viewport::world().zoomed_out().zoomed_out().zoomed_out().zoom, 0);
        let mut deep = Viewport::world();
        for _ in 0..30 {
            deep = deep.zoomed_in();
        }
        assert_eq!(deep.zoom, MAX_ZOOM);
    }
}
