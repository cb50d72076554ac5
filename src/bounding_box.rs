// src/bounding_box.rs
// Bounds of drawn whiteboard content, used to crop captures before OCR

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BOUNDING_PADDING: f64 = 50.0;
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

const MIN_WIDTH: f64 = 400.0;
const MIN_HEIGHT: f64 = 200.0;
const CROWDED_AREA_PER_ELEMENT: f64 = 5000.0;
const CROWDED_EXPANSION: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementData {
    /// Flat `[x1, y1, x2, y2, ...]`
    pub points: Vec<f64>,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ElementShape {
    Pen {
        points: Vec<f64>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Polygon {
        points: Vec<f64>,
        closed: bool,
    },
    Triangle {
        points: Vec<f64>,
        closed: bool,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: Option<f64>,
    },
    Equation {
        x: f64,
        y: f64,
        expression: String,
        font_size: Option<f64>,
    },
    MeasureAngle(MeasurementData),
    MeasureDistance(MeasurementData),
    Eraser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardElement {
    pub id: String,
    #[serde(flatten)]
    pub shape: ElementShape,
    pub color: String,
    pub stroke_width: f64,
    pub created_at: DateTime<Utc>,
}

impl WhiteboardElement {
    pub fn new(id: impl Into<String>, shape: ElementShape) -> Self {
        Self {
            id: id.into(),
            shape,
            color: "#000000".to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            created_at: Utc::now(),
        }
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.min_x = self.min_x.min(min_x);
        self.min_y = self.min_y.min(min_y);
        self.max_x = self.max_x.max(max_x);
        self.max_y = self.max_y.max(max_y);
    }

    fn include_point(&mut self, x: f64, y: f64, pad: f64) {
        self.include(x - pad, y - pad, x + pad, y + pad);
    }

    /// Returns false when there were no usable points.
    fn include_flat_points(&mut self, points: &[f64], pad: f64) -> bool {
        if points.len() < 2 {
            return false;
        }
        for pair in points.chunks_exact(2) {
            self.include_point(pair[0], pair[1], pad);
        }
        true
    }

    fn is_empty(&self) -> bool {
        !self.min_x.is_finite() || !self.min_y.is_finite() || !self.max_x.is_finite() || !self.max_y.is_finite()
    }
}

/// Smallest box that covers every drawn element plus `padding`.
///
/// Returns `None` when there is nothing with coordinates to cover.
pub fn calculate_bounding_box(elements: &[WhiteboardElement], padding: f64) -> Option<BoundingBox> {
    if elements.is_empty() {
        return None;
    }

    let mut extent = Extent::empty();
    let mut processed = 0usize;

    for element in elements {
        // Strokes extend half their width past the coordinates
        let stroke_width = if element.stroke_width > 0.0 {
            element.stroke_width
        } else {
            DEFAULT_STROKE_WIDTH
        };
        let pad = stroke_width / 2.0;

        let counted = match &element.shape {
            ElementShape::Pen { points }
            | ElementShape::Polygon { points, .. }
            | ElementShape::Triangle { points, .. } => extent.include_flat_points(points, pad),
            ElementShape::MeasureAngle(data) | ElementShape::MeasureDistance(data) => {
                extent.include_flat_points(&data.points, pad)
            }
            ElementShape::Line { x1, y1, x2, y2 } => {
                extent.include_point(*x1, *y1, pad);
                extent.include_point(*x2, *y2, pad);
                true
            }
            ElementShape::Circle { x, y, radius } => {
                extent.include_point(*x, *y, radius + pad);
                true
            }
            ElementShape::Rectangle { x, y, width, height } => {
                extent.include(x - pad, y - pad, x + width + pad, y + height + pad);
                true
            }
            ElementShape::Text { x, y, text, font_size } => {
                let font_size = font_size.unwrap_or(DEFAULT_FONT_SIZE);
                let width = text.chars().count() as f64 * font_size * 0.7;
                extent.include(*x, *y, x + width, y + font_size * 1.4);
                true
            }
            ElementShape::Equation { x, y, expression, font_size } => {
                let font_size = font_size.unwrap_or(DEFAULT_FONT_SIZE);
                let width = expression.chars().count() as f64 * font_size * 0.7;
                extent.include(*x, *y, x + width, y + font_size * 1.6);
                true
            }
            ElementShape::Eraser => false,
        };

        if counted {
            processed += 1;
        }
    }

    debug!(
        elements = elements.len(),
        processed,
        min_x = extent.min_x,
        min_y = extent.min_y,
        max_x = extent.max_x,
        max_y = extent.max_y,
        "Computed raw whiteboard bounds"
    );

    if extent.is_empty() {
        warn!(elements = elements.len(), "No element coordinates found for bounding box");
        return None;
    }

    let mut min_x = (extent.min_x - padding).max(0.0);
    let mut min_y = (extent.min_y - padding).max(0.0);
    let mut max_x = extent.max_x + padding;
    let mut max_y = extent.max_y + padding;

    let width = max_x - min_x;
    let height = max_y - min_y;

    if width < MIN_WIDTH {
        let expand = (MIN_WIDTH - width) / 2.0;
        min_x = (min_x - expand).max(0.0);
        max_x += expand;
    }

    if height < MIN_HEIGHT {
        let expand = (MIN_HEIGHT - height) / 2.0;
        min_y = (min_y - expand).max(0.0);
        max_y += expand;
    }

    // Measured on the padded box, before the minimum-size expansion
    let area_per_element = (width * height) / elements.len() as f64;
    if elements.len() > 2 && area_per_element < CROWDED_AREA_PER_ELEMENT {
        warn!(
            elements = elements.len(),
            area_per_element,
            "Bounding box looks too small for element count, expanding"
        );
        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        let new_width = (max_x - min_x) * CROWDED_EXPANSION;
        let new_height = (max_y - min_y) * CROWDED_EXPANSION;
        min_x = (center_x - new_width / 2.0).max(0.0);
        min_y = (center_y - new_height / 2.0).max(0.0);
        max_x = center_x + new_width / 2.0;
        max_y = center_y + new_height / 2.0;
    }

    let bbox = BoundingBox {
        min_x: min_x.round(),
        min_y: min_y.round(),
        max_x: max_x.round(),
        max_y: max_y.round(),
        width: (max_x - min_x).round(),
        height: (max_y - min_y).round(),
    };

    debug!(?bbox, "Final whiteboard bounding box");

    Some(bbox)
}
