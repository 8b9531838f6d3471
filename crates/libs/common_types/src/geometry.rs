use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Axis-aligned box in image pixels, origin at the top-left corner.
///
/// Keys missing from the source payload deserialize to `0.0`, so a malformed
/// box degrades into a zero-sized one instead of failing the whole word list.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct PixelBBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl PixelBBox {
    /// Builds the tightest axis-aligned box around a flat `[x0, y0, x1, y1, ...]` polygon.
    ///
    /// Returns `None` when the polygon has fewer than four points.
    #[must_use]
    pub fn from_polygon(polygon: &[f64]) -> Option<Self> {
        if polygon.len() < 8 {
            return None;
        }
        let xs = polygon.iter().step_by(2);
        let ys = polygon.iter().skip(1).step_by(2);
        let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        let (min_y, max_y) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// Axis-aligned box in millimeters, rounded to two decimals.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct PhysicalBBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Page size in millimeters.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

/// Page size in pixels, as reported by the layout analysis service.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct PagePixels {
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_reduces_to_bounding_box() {
        let polygon = [10.0, 20.0, 50.0, 18.0, 52.0, 40.0, 9.0, 42.0];
        let bbox = PixelBBox::from_polygon(&polygon).expect("four points");
        assert_eq!(
            bbox,
            PixelBBox {
                x: 9.0,
                y: 18.0,
                width: 43.0,
                height: 24.0,
            }
        );
    }

    #[test]
    fn short_polygon_is_skipped() {
        assert!(PixelBBox::from_polygon(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).is_none());
    }

    #[test]
    fn missing_bbox_keys_default_to_zero() -> serde_json::Result<()> {
        let bbox: PixelBBox = serde_json::from_str(r#"{"x": 12.5, "y": 4}"#)?;
        assert_eq!(bbox.x, 12.5);
        assert_eq!(bbox.y, 4.0);
        assert_eq!(bbox.width, 0.0);
        assert_eq!(bbox.height, 0.0);
        Ok(())
    }
}
