//! Keeps projected damage boxes visually locked to the preview image as the
//! window resizes or the layout reflows, without reprojecting every frame.

use crate::geometry::{project, BoundingBox, ImageMetrics, ScreenRect};

pub struct BoxOverlay {
    metrics: ImageMetrics,
    boxes: Vec<BoundingBox>,
    projected: Vec<ScreenRect>,
}

impl Default for BoxOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxOverlay {
    pub fn new() -> Self {
        Self {
            metrics: ImageMetrics::default(),
            boxes: Vec::new(),
            projected: Vec::new(),
        }
    }

    /// Replace the box set (native-pixel coordinates) and reproject.
    pub fn set_boxes(&mut self, boxes: Vec<BoundingBox>) {
        self.boxes = boxes;
        self.reproject();
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.projected.clear();
        self.metrics = ImageMetrics::default();
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Feed the latest measurement of the displayed image. Projections are
    /// recomputed only when something actually changed; returns whether a
    /// recompute happened. Call once per frame: image load, window resize
    /// and layout reflow all surface here as a metrics change.
    pub fn observe(&mut self, natural: (f32, f32), displayed: (f32, f32)) -> bool {
        let metrics = ImageMetrics::new(natural, displayed);
        if metrics == self.metrics {
            return false;
        }
        log::debug!(
            "image metrics changed: {}x{} shown at {}x{}",
            metrics.natural_width,
            metrics.natural_height,
            metrics.displayed_width,
            metrics.displayed_height
        );
        self.metrics = metrics;
        self.reproject();
        true
    }

    pub fn projected(&self) -> &[ScreenRect] {
        &self.projected
    }

    fn reproject(&mut self) {
        self.projected = self
            .boxes
            .iter()
            .map(|b| project(b, &self.metrics))
            .collect();
    }
}
