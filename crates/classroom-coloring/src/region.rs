//! Paintable regions and their colors

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CSS color value
///
/// Hex values and keywords are lower-cased so equal colors compare equal.
/// Anything else, such as `url(#SkyGrad)` paint references, keeps its case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// The "no fill" value
    pub const NONE: &'static str = "none";

    /// Normalize a color string
    #[must_use]
    pub fn new(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            Self::none()
        } else if is_case_insensitive(value) {
            Self(value.to_ascii_lowercase())
        } else {
            Self(value.to_string())
        }
    }

    /// The default fill of a region without one
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self(Self::NONE.to_string())
    }

    /// Whether this is the "no fill" value
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0 == Self::NONE
    }

    /// Normalized string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_case_insensitive(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => value.bytes().all(|b| b.is_ascii_alphabetic()),
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Stable handle of a region: its position among the image's shape elements
/// in document order, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub usize);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometry element kinds that can hold a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// `<path>`
    Path,
    /// `<rect>`
    Rect,
    /// `<circle>`
    Circle,
    /// `<ellipse>`
    Ellipse,
    /// `<polygon>`
    Polygon,
    /// `<polyline>`
    Polyline,
}

impl ShapeKind {
    /// Map an element's local name to a shape kind
    ///
    /// Groups, text, lines and anything unrecognized return `None`.
    #[must_use]
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"path" => Some(Self::Path),
            b"rect" => Some(Self::Rect),
            b"circle" => Some(Self::Circle),
            b"ellipse" => Some(Self::Ellipse),
            b"polygon" => Some(Self::Polygon),
            b"polyline" => Some(Self::Polyline),
            _ => None,
        }
    }

    /// Element name
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
        }
    }
}

/// One shape of the loaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable handle
    pub id: RegionId,
    /// The element's `id` attribute, if it has one
    pub element_id: Option<String>,
    /// Geometry kind
    pub kind: ShapeKind,
    /// Fill as loaded
    pub original_color: Color,
    /// Fill currently shown
    pub current_color: Color,
    /// Line-art boundary, never fillable
    pub is_outline: bool,
}

impl Region {
    /// Whether the region shows something other than its loaded fill
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.current_color != self.original_color
    }
}

/// Indexed collection of regions; `RegionId(i)` is at position `i`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Regions(Vec<Region>);

impl Regions {
    /// Wrap regions already ordered by id
    #[must_use]
    pub(crate) fn new(regions: Vec<Region>) -> Self {
        debug_assert!(regions.iter().enumerate().all(|(i, r)| r.id.0 == i));
        Self(regions)
    }

    /// Region by handle
    #[inline]
    #[must_use]
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.0.get(id.0)
    }

    /// Set a region's current fill, returning the previous one
    pub fn set_color(&mut self, id: RegionId, color: Color) -> Option<Color> {
        self.0
            .get_mut(id.0)
            .map(|region| std::mem::replace(&mut region.current_color, color))
    }

    /// All regions in document order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Region] {
        &self.0
    }

    /// Number of regions, outlines included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No shapes at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_normalize() {
        assert_eq!(Color::new("  #FFFFFF "), Color::new("#ffffff"));
        assert!(Color::new("").is_none());
        assert_eq!(Color::from("Red").as_str(), "red");
    }

    #[test]
    fn paint_references_keep_their_case() {
        assert_eq!(Color::new(" url(#SkyGrad) ").as_str(), "url(#SkyGrad)");
        assert_ne!(Color::new("url(#SkyGrad)"), Color::new("url(#skygrad)"));
        assert_eq!(Color::new("#AbC").as_str(), "#abc");
    }

    #[test]
    fn region_json_matches_cli_listing() {
        let region = Region {
            id: RegionId(3),
            element_id: Some("roof".to_string()),
            kind: ShapeKind::Polygon,
            original_color: Color::new("Red"),
            current_color: Color::new("#1E88E5"),
            is_outline: false,
        };

        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["element_id"], "roof");
        assert_eq!(value["original_color"], "red");
        assert_eq!(value["current_color"], "#1e88e5");

        let back: Region = serde_json::from_value(value).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn shape_kinds() {
        assert_eq!(ShapeKind::from_tag(b"polygon"), Some(ShapeKind::Polygon));
        assert_eq!(ShapeKind::from_tag(b"g"), None);
        assert_eq!(ShapeKind::from_tag(b"text"), None);
        assert_eq!(ShapeKind::from_tag(b"line"), None);
        assert_eq!(ShapeKind::Ellipse.tag(), "ellipse");
    }

    #[test]
    fn set_color_returns_previous() {
        let mut regions = Regions::new(vec![Region {
            id: RegionId(0),
            element_id: None,
            kind: ShapeKind::Rect,
            original_color: Color::new("white"),
            current_color: Color::new("white"),
            is_outline: false,
        }]);

        let previous = regions.set_color(RegionId(0), Color::new("red"));
        assert_eq!(previous, Some(Color::new("white")));
        assert!(regions.get(RegionId(0)).unwrap().is_modified());
        assert_eq!(regions.set_color(RegionId(7), Color::new("red")), None);
    }
}
