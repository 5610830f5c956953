//! SVG source and its region index
//!
//! Loading walks the markup once and records every directly drawn shape
//! element as a [`Region`] in document order. Shapes under `<defs>`,
//! `<clipPath>`, `<mask>` and similar containers are left out. Rendering walks the same markup again and
//! rewrites only the shapes whose fill differs from the loaded one, so an
//! untouched region comes out byte-for-byte as it went in.

use crate::config::ColoringConfig;
use crate::error::{ExportError, LoadError};
use crate::region::{Color, Region, RegionId, Regions, ShapeKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::sync::Arc;

/// Immutable SVG source of a loaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    source: Arc<str>,
}

/// Presentation attributes of one shape
#[derive(Debug, Default)]
struct ShapeAttrs {
    element_id: Option<String>,
    fill: Option<String>,
    stroke: Option<String>,
    stroke_width: Option<String>,
    style: Option<String>,
}

impl ShapeAttrs {
    fn read(start: &BytesStart<'_>) -> Result<Self, String> {
        let mut attrs = Self::default();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let slot = match attr.key.as_ref() {
                b"id" => &mut attrs.element_id,
                b"fill" => &mut attrs.fill,
                b"stroke" => &mut attrs.stroke,
                b"stroke-width" => &mut attrs.stroke_width,
                b"style" => &mut attrs.style,
                _ => continue,
            };
            *slot = Some(attr.unescape_value().map_err(|e| e.to_string())?.into_owned());
        }
        Ok(attrs)
    }

    /// Inline style first, then the presentation attribute
    fn resolve(&self, property: &str) -> Option<String> {
        self.style
            .as_deref()
            .and_then(|style| style_value(style, property))
            .or_else(|| match property {
                "fill" => self.fill.clone(),
                "stroke" => self.stroke.clone(),
                "stroke-width" => self.stroke_width.clone(),
                _ => None,
            })
    }
}

impl SvgDocument {
    /// Parse `source` and index its shapes
    ///
    /// # Errors
    /// - `LoadError::Markup` for malformed XML
    /// - `LoadError::NotSvg` when there is no `<svg>` element
    pub fn parse(
        source: impl Into<Arc<str>>,
        config: &ColoringConfig,
    ) -> Result<(Self, Regions), LoadError> {
        let source: Arc<str> = source.into();
        let mut reader = Reader::from_str(&source);
        let mut regions = Vec::new();
        let mut saw_svg = false;

        let mut hidden = HiddenDepth::default();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| markup_error(&reader, e))?;
            if matches!(event, Event::Eof) {
                break;
            }
            let visible = hidden.visible_shape(&event);
            let (Event::Start(start) | Event::Empty(start)) = event else {
                continue;
            };
            let local = start.local_name();
            if local.as_ref() == b"svg" {
                saw_svg = true;
                continue;
            }
            if !visible {
                continue;
            }
            let Some(kind) = ShapeKind::from_tag(local.as_ref()) else {
                continue;
            };
            let attrs = ShapeAttrs::read(&start).map_err(|e| markup_error(&reader, e))?;
            let color = attrs.resolve("fill").map_or_else(Color::none, Color::from);
            let stroke = attrs.resolve("stroke").map(Color::from);
            let stroke_width = attrs.resolve("stroke-width").as_deref().and_then(parse_length);

            regions.push(Region {
                id: RegionId(regions.len()),
                element_id: attrs.element_id,
                kind,
                original_color: color.clone(),
                current_color: color,
                is_outline: config.is_outline(stroke.as_ref(), stroke_width),
            });
        }

        if !saw_svg {
            return Err(LoadError::NotSvg);
        }

        tracing::debug!(
            regions = regions.len(),
            outlines = regions.iter().filter(|r| r.is_outline).count(),
            "indexed svg regions"
        );

        Ok((Self { source }, Regions::new(regions)))
    }

    /// Original markup
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the source with the fills of `regions` applied
    ///
    /// # Errors
    /// `ExportError::Render` if the markup cannot be re-emitted.
    pub fn render(&self, regions: &Regions) -> Result<String, ExportError> {
        let mut reader = Reader::from_str(&self.source);
        let mut writer = Writer::new(Vec::with_capacity(self.source.len()));
        let mut next = 0;
        let mut hidden = HiddenDepth::default();

        loop {
            let event = reader.read_event().map_err(render_error)?;
            if matches!(event, Event::Eof) {
                break;
            }
            let event = if hidden.visible_shape(&event) {
                let region = regions.get(RegionId(next));
                next += 1;
                match event {
                    Event::Start(start) => Event::Start(repaint(start, region)?),
                    Event::Empty(start) => Event::Empty(repaint(start, region)?),
                    other => other,
                }
            } else {
                event
            };
            writer.write_event(event).map_err(render_error)?;
        }

        String::from_utf8(writer.into_inner()).map_err(render_error)
    }
}

fn is_shape(start: &BytesStart<'_>) -> bool {
    ShapeKind::from_tag(start.local_name().as_ref()).is_some()
}

/// Elements whose children are only drawn by reference, if at all
fn is_hidden_container(name: &[u8]) -> bool {
    matches!(
        name,
        b"defs" | b"clipPath" | b"mask" | b"symbol" | b"pattern" | b"marker"
    )
}

/// Nesting depth inside hidden containers
#[derive(Debug, Default)]
struct HiddenDepth(usize);

impl HiddenDepth {
    /// Track `event`; true when it opens a shape that is drawn directly
    fn visible_shape(&mut self, event: &Event<'_>) -> bool {
        match event {
            Event::Start(start) if is_hidden_container(start.local_name().as_ref()) => {
                self.0 += 1;
                false
            }
            Event::End(end) if is_hidden_container(end.local_name().as_ref()) => {
                self.0 = self.0.saturating_sub(1);
                false
            }
            Event::Start(start) | Event::Empty(start) => self.0 == 0 && is_shape(start),
            _ => false,
        }
    }
}

/// Rewrite a shape's `fill` attribute and inline `style` fill together
fn repaint<'a>(start: BytesStart<'a>, region: Option<&Region>) -> Result<BytesStart<'a>, ExportError> {
    let Some(region) = region.filter(|r| r.is_modified()) else {
        return Ok(start);
    };
    let color = region.current_color.as_str();

    let mut out = BytesStart::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    let mut wrote_fill = false;
    let mut wrote_style = false;

    for attr in start.attributes() {
        let attr = attr.map_err(render_error)?;
        match attr.key.as_ref() {
            b"fill" => {
                out.push_attribute(("fill", color));
                wrote_fill = true;
            }
            b"style" => {
                let style = attr.unescape_value().map_err(render_error)?;
                out.push_attribute(("style", with_style_fill(&style, color).as_str()));
                wrote_style = true;
            }
            _ => out.push_attribute(attr),
        }
    }
    if !wrote_fill {
        out.push_attribute(("fill", color));
    }
    if !wrote_style {
        out.push_attribute(("style", format!("fill:{color}").as_str()));
    }

    Ok(out)
}

fn declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        Some((name.trim(), value.trim()))
    })
}

fn style_value(style: &str, property: &str) -> Option<String> {
    declarations(style)
        .filter(|(name, _)| name.eq_ignore_ascii_case(property))
        .last()
        .map(|(_, value)| value.to_string())
}

fn with_style_fill(style: &str, color: &str) -> String {
    let mut replaced = false;
    let mut parts: Vec<String> = declarations(style)
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("fill") {
                replaced = true;
                format!("fill:{color}")
            } else {
                format!("{name}:{value}")
            }
        })
        .collect();
    if !replaced {
        parts.insert(0, format!("fill:{color}"));
    }
    parts.join(";")
}

fn parse_length(value: &str) -> Option<f32> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

fn markup_error(reader: &Reader<&[u8]>, err: impl Display) -> LoadError {
    LoadError::Markup {
        position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
        message: err.to_string(),
    }
}

fn render_error(err: impl Display) -> ExportError {
    ExportError::Render(err.to_string())
}
