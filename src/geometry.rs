use serde::{Deserialize, Serialize};

// ── Geometry Types ──────────────────────────────────────────────────────────

/// A damage region in native image pixels, origin at the image's top-left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Intrinsic resolution of the displayed image plus its current on-screen
/// size. Remeasured on image load and whenever layout resizes the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageMetrics {
    pub natural_width: f32,
    pub natural_height: f32,
    pub displayed_width: f32,
    pub displayed_height: f32,
}

impl Default for ImageMetrics {
    // 1.0 everywhere so projections stay finite before the first measurement.
    fn default() -> Self {
        Self {
            natural_width: 1.0,
            natural_height: 1.0,
            displayed_width: 1.0,
            displayed_height: 1.0,
        }
    }
}

impl ImageMetrics {
    pub fn new(natural: (f32, f32), displayed: (f32, f32)) -> Self {
        Self {
            natural_width: natural.0,
            natural_height: natural.1,
            displayed_width: displayed.0,
            displayed_height: displayed.1,
        }
    }
}

/// On-screen rectangle, relative to the displayed image's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

// ── Projection ──────────────────────────────────────────────────────────────

/// Project a native-pixel box onto the screen.
///
/// X and Y scale independently: layout constraints can make the displayed
/// aspect ratio diverge slightly from the natural one, and a uniform scale
/// would misplace boxes when that happens. Output is rounded to whole
/// pixels, ties away from zero.
pub fn project(bbox: &BoundingBox, metrics: &ImageMetrics) -> ScreenRect {
    let scale_x = metrics.displayed_width / floor_dim(metrics.natural_width);
    let scale_y = metrics.displayed_height / floor_dim(metrics.natural_height);
    ScreenRect {
        left: (bbox.x * scale_x).round() as i32,
        top: (bbox.y * scale_y).round() as i32,
        width: (bbox.width * scale_x).round() as i32,
        height: (bbox.height * scale_y).round() as i32,
    }
}

// Natural dimensions of 0 would divide by zero; substitute the default
// metric value and produce a best-effort rect instead of crashing.
fn floor_dim(dim: f32) -> f32 {
    if dim > 0.0 {
        dim
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn identity_when_displayed_matches_natural() {
        let m = ImageMetrics::new((1200.0, 800.0), (1200.0, 800.0));
        let r = project(&bbox(100.0, 50.0, 200.0, 80.0), &m);
        assert_eq!(
            r,
            ScreenRect {
                left: 100,
                top: 50,
                width: 200,
                height: 80
            }
        );
    }

    #[test]
    fn halved_display_halves_every_field() {
        // The documented scenario: 1200x800 shown at 600x400.
        let m = ImageMetrics::new((1200.0, 800.0), (600.0, 400.0));
        let r = project(&bbox(100.0, 50.0, 200.0, 80.0), &m);
        assert_eq!(
            r,
            ScreenRect {
                left: 50,
                top: 25,
                width: 100,
                height: 40
            }
        );
    }

    #[test]
    fn doubling_displayed_width_doubles_horizontal_fields_only() {
        let base = ImageMetrics::new((1000.0, 1000.0), (500.0, 500.0));
        let wide = ImageMetrics::new((1000.0, 1000.0), (1000.0, 500.0));
        let b = bbox(120.0, 40.0, 300.0, 200.0);
        let r0 = project(&b, &base);
        let r1 = project(&b, &wide);
        assert_eq!(r1.left, r0.left * 2);
        assert_eq!(r1.width, r0.width * 2);
        assert_eq!(r1.top, r0.top);
        assert_eq!(r1.height, r0.height);
    }

    #[test]
    fn projection_is_idempotent_for_fixed_inputs() {
        let m = ImageMetrics::new((1920.0, 1080.0), (711.0, 400.0));
        let b = bbox(33.0, 77.0, 411.0, 250.0);
        let first = project(&b, &m);
        for _ in 0..5 {
            assert_eq!(project(&b, &m), first);
        }
    }

    #[test]
    fn zero_natural_dimensions_fall_back_to_one() {
        let m = ImageMetrics::new((0.0, 0.0), (600.0, 400.0));
        let r = project(&bbox(1.0, 1.0, 2.0, 2.0), &m);
        // Best effort, not a crash: scale factors become displayed/1.
        assert_eq!(
            r,
            ScreenRect {
                left: 600,
                top: 400,
                width: 1200,
                height: 800
            }
        );
    }

    #[test]
    fn ties_round_away_from_zero() {
        // 0.5 scale turns odd coordinates into exact .5 values.
        let m = ImageMetrics::new((100.0, 100.0), (50.0, 50.0));
        let r = project(&bbox(3.0, 5.0, 7.0, 9.0), &m);
        assert_eq!(
            r,
            ScreenRect {
                left: 2,
                top: 3,
                width: 4,
                height: 5
            }
        );
    }

    #[test]
    fn default_metrics_are_all_ones() {
        let m = ImageMetrics::default();
        let r = project(&bbox(10.0, 20.0, 30.0, 40.0), &m);
        assert_eq!(
            r,
            ScreenRect {
                left: 10,
                top: 20,
                width: 30,
                height: 40
            }
        );
    }
}
