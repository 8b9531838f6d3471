use app_state::MM_PER_INCH;
use common_types::{PageDimensions, PhysicalBBox, PixelBBox};
use exif::{In, Tag, Value};
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Screen resolution, used when an image doesn't say how it was scanned.
pub const DEFAULT_DPI: u32 = 96;

#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("Resolution must be a positive number of dots per inch, got {0}")]
    InvalidResolution(u32),

    #[error("Page size must be finite and non-negative, got {width}x{height}px")]
    InvalidPageSize { width: f64, height: f64 },
}

/// Rounds to two decimals, ties away from zero.
#[must_use]
pub fn round_mm(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts between pixel and millimeter coordinates for one page at a fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    dpi: u32,
    page_width_px: f64,
    page_height_px: f64,
    page_dimensions: PageDimensions,
}

impl UnitConverter {
    /// Creates a converter for a page of `page_width_px` x `page_height_px` scanned at `dpi`.
    ///
    /// A zero-sized page is accepted; a zero resolution is not.
    pub fn new(page_width_px: f64, page_height_px: f64, dpi: u32) -> Result<Self, UnitError> {
        if dpi == 0 {
            return Err(UnitError::InvalidResolution(dpi));
        }
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(page_width_px) || !valid(page_height_px) {
            return Err(UnitError::InvalidPageSize {
                width: page_width_px,
                height: page_height_px,
            });
        }

        let mut converter = Self {
            dpi,
            page_width_px,
            page_height_px,
            page_dimensions: PageDimensions::default(),
        };
        converter.page_dimensions = PageDimensions {
            width: round_mm(converter.pixels_to_millimeters(page_width_px)),
            height: round_mm(converter.pixels_to_millimeters(page_height_px)),
        };

        info!(
            "Initialized converter: {}x{}px @ {}dpi -> {:.2}x{:.2}mm",
            page_width_px,
            page_height_px,
            dpi,
            converter.page_dimensions.width,
            converter.page_dimensions.height
        );
        Ok(converter)
    }

    pub fn with_default_dpi(page_width_px: f64, page_height_px: f64) -> Result<Self, UnitError> {
        Self::new(page_width_px, page_height_px, DEFAULT_DPI)
    }

    #[must_use]
    pub const fn dpi(&self) -> u32 {
        self.dpi
    }

    #[must_use]
    pub const fn page_pixels(&self) -> (f64, f64) {
        (self.page_width_px, self.page_height_px)
    }

    #[must_use]
    pub fn pixels_to_millimeters(&self, px: f64) -> f64 {
        px / f64::from(self.dpi) * MM_PER_INCH
    }

    #[must_use]
    pub fn millimeters_to_pixels(&self, mm: f64) -> f64 {
        mm / MM_PER_INCH * f64::from(self.dpi)
    }

    /// Converts every component of a pixel box to millimeters, rounded to two decimals.
    ///
    /// Negative pixel values (polygons poking out of the page) clamp to the page edge.
    #[must_use]
    pub fn convert_bbox(&self, bbox: &PixelBBox) -> PhysicalBBox {
        let mm = |px: f64| round_mm(self.pixels_to_millimeters(px.max(0.0)));
        PhysicalBBox {
            x: mm(bbox.x),
            y: mm(bbox.y),
            width: mm(bbox.width),
            height: mm(bbox.height),
        }
    }

    /// Page size in millimeters, computed once at construction.
    #[must_use]
    pub const fn page_dimensions_mm(&self) -> PageDimensions {
        self.page_dimensions
    }
}

/// Reads the horizontal resolution embedded in an image, falling back to `default_dpi`.
///
/// Looks at the JFIF density header, EXIF `XResolution` and the PNG `pHYs` chunk, in that
/// order. Never fails: unreadable or nonsensical metadata just means the default is used.
#[must_use]
pub fn detect_resolution(image_bytes: &[u8], default_dpi: u32) -> u32 {
    let embedded = jfif_dpi(image_bytes)
        .or_else(|| exif_dpi(image_bytes))
        .or_else(|| png_dpi(image_bytes));

    match embedded {
        Some(dpi) if dpi.is_finite() && dpi >= 1.0 => {
            let dpi = dpi as u32;
            info!("Detected DPI from image metadata: {}", dpi);
            dpi
        }
        Some(dpi) => {
            warn!("Ignoring unusable embedded resolution: {}", dpi);
            info!("Using default DPI: {}", default_dpi);
            default_dpi
        }
        None => {
            info!("Using default DPI: {}", default_dpi);
            default_dpi
        }
    }
}

fn jfif_dpi(bytes: &[u8]) -> Option<f64> {
    let header = bytes.get(..18)?;
    if !header.starts_with(&[0xFF, 0xD8, 0xFF, 0xE0]) || &header[6..11] != b"JFIF\0" {
        return None;
    }
    let x_density = f64::from(u16::from_be_bytes([header[14], header[15]]));
    // Units: 0 = aspect ratio only, 1 = dots per inch, 2 = dots per cm.
    match header[13] {
        1 => Some(x_density),
        2 => Some(x_density * 2.54),
        _ => None,
    }
}

fn exif_dpi(bytes: &[u8]) -> Option<f64> {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF resolution available: {}", e);
            return None;
        }
    };
    let field = exif.get_field(Tag::XResolution, In::PRIMARY)?;
    let x_resolution = match &field.value {
        Value::Rational(values) => values.first()?.to_f64(),
        other => {
            warn!("Malformed EXIF XResolution value: {:?}", other);
            return None;
        }
    };
    // ResolutionUnit 3 means dots per centimeter.
    let per_centimeter = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        == Some(3);

    Some(if per_centimeter {
        x_resolution * 2.54
    } else {
        x_resolution
    })
}

fn png_dpi(bytes: &[u8]) -> Option<f64> {
    let reader = match png::Decoder::new(Cursor::new(bytes)).read_info() {
        Ok(reader) => reader,
        Err(e) => {
            debug!("Not a readable PNG: {}", e);
            return None;
        }
    };
    let dims = reader.info().pixel_dims?;
    matches!(dims.unit, png::Unit::Meter).then(|| f64::from(dims.xppu) * MM_PER_INCH / 1000.0)
}
