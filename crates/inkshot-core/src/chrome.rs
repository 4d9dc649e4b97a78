//! Canvas chrome: the frame drawn around the captured image.

use crate::shapes::SerializableColor;
use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Largest accepted padding.
pub const MAX_PADDING: f64 = 512.0;

/// Fill behind the image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Background {
    /// Transparent.
    #[default]
    None,
    Solid { color: SerializableColor },
    /// Two-stop linear gradient; `angle` in degrees, 0 = left to right.
    Gradient {
        from: SerializableColor,
        to: SerializableColor,
        #[serde(default)]
        angle: f64,
    },
}

/// Drop shadow under the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub color: SerializableColor,
    pub offset: Vec2,
    /// Gaussian sigma.
    pub blur_radius: f64,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: SerializableColor::new(0, 0, 0, 110),
            offset: Vec2::new(0.0, 8.0),
            blur_radius: 16.0,
        }
    }
}

/// Background, padding, corner radius and shadow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeSettings {
    pub background: Background,
    pub padding: f64,
    pub corner_radius: f64,
    pub shadow: ShadowSettings,
}

impl ChromeSettings {
    /// Copy with out-of-range values clamped.
    pub fn sanitized(self) -> Self {
        Self {
            padding: self.padding.clamp(0.0, MAX_PADDING),
            corner_radius: self.corner_radius.max(0.0),
            shadow: ShadowSettings {
                blur_radius: self.shadow.blur_radius.max(0.0),
                ..self.shadow
            },
            ..self
        }
    }

    /// Size of the whole canvas for an image of `image` size.
    pub fn canvas_size(&self, image: Size) -> Size {
        Size::new(
            image.width + 2.0 * self.padding,
            image.height + 2.0 * self.padding,
        )
    }

    /// Where the image sits on the canvas.
    pub fn image_rect(&self, image: Size) -> Rect {
        Rect::new(
            self.padding,
            self.padding,
            self.padding + image.width,
            self.padding + image.height,
        )
    }

    /// Corner radius limited to half the shorter image side.
    pub fn effective_corner_radius(&self, image: Size) -> f64 {
        self.corner_radius.min(image.width.min(image.height) / 2.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_geometry() {
        let chrome = ChromeSettings {
            padding: 40.0,
            ..Default::default()
        };
        let image = Size::new(200.0, 100.0);
        assert_eq!(chrome.canvas_size(image), Size::new(280.0, 180.0));
        assert_eq!(chrome.image_rect(image), Rect::new(40.0, 40.0, 240.0, 140.0));
    }

    #[test]
    fn test_sanitized_clamps() {
        let chrome = ChromeSettings {
            padding: -5.0,
            corner_radius: -1.0,
            ..Default::default()
        }
        .sanitized();
        assert!(chrome.padding.abs() < f64::EPSILON);
        assert!(chrome.corner_radius.abs() < f64::EPSILON);
    }

    #[test]
    fn test_corner_radius_limited_by_image() {
        let chrome = ChromeSettings {
            corner_radius: 500.0,
            ..Default::default()
        };
        assert!((chrome.effective_corner_radius(Size::new(80.0, 40.0)) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let chrome: ChromeSettings =
            serde_json::from_str(r#"{"padding": 12.0, "background": {"kind": "Solid", "color": {"r":1,"g":2,"b":3,"a":255}}}"#)
                .unwrap();
        assert!((chrome.padding - 12.0).abs() < f64::EPSILON);
        assert_eq!(
            chrome.background,
            Background::Solid {
                color: SerializableColor::new(1, 2, 3, 255)
            }
        );
        assert!(!chrome.shadow.enabled);
    }
}
