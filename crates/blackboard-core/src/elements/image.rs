//! Image element content.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// A raster image referenced by source, with its natural dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// A `data:` URL or an external reference.
    pub src: String,
    #[serde(default)]
    pub natural_width: f64,
    #[serde(default)]
    pub natural_height: f64,
}

impl ImagePayload {
    pub fn new(src: impl Into<String>, natural_width: f64, natural_height: f64) -> Self {
        Self {
            src: src.into(),
            natural_width,
            natural_height,
        }
    }

    pub fn natural_size(&self) -> Size {
        Size::new(self.natural_width, self.natural_height)
    }

    /// Whether the image bytes are embedded in the source.
    pub fn is_embedded(&self) -> bool {
        self.src.starts_with("data:")
    }

    /// MIME type declared by an embedded source (`data:image/png;base64,...`).
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.src.strip_prefix("data:")?;
        let end = rest.find([';', ','])?;
        Some(&rest[..end])
    }

    /// Scale the natural size down to fit within `max`, keeping the aspect ratio.
    pub fn fitted_size(&self, max: Size) -> Size {
        let natural = self.natural_size();
        if natural.width <= 0.0 || natural.height <= 0.0 {
            return Size::ZERO;
        }
        let scale = (max.width / natural.width)
            .min(max.height / natural.height)
            .min(1.0);
        Size::new(natural.width * scale, natural.height * scale)
    }
}
