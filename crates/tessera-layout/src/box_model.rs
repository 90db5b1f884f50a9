//! Box geometry and the adjustment table.
//!
//! A node's measured border box and its CSS margin, border and padding are
//! captured once when the node tree is built. Later passes never rewrite them;
//! they layer corrections on top through [`BoxAdjustment`], one slot per
//! margin and padding edge.

use strum_macros::{Display, EnumIter};
use tessera_dom::DomRect;

/// A rectangle positioned in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grows the rectangle outward by `edges`.
    #[must_use]
    pub fn expanded_by(&self, edges: EdgeSizes) -> Rect {
        Rect {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: (self.width + edges.left + edges.right).max(0.0),
            height: (self.height + edges.top + edges.bottom).max(0.0),
        }
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Whether the vertical extents overlap, i.e. both boxes share a line.
    #[must_use]
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }
}

impl From<DomRect> for Rect {
    fn from(rect: DomRect) -> Self {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// Size of one edge.
    #[must_use]
    pub fn get(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    /// Mutable size of one edge.
    pub fn get_mut(&mut self, edge: Edge) -> &mut f32 {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Right => &mut self.right,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
        }
    }

    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// One side of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Edge {
    /// Top side.
    Top,
    /// Right side.
    Right,
    /// Bottom side.
    Bottom,
    /// Left side.
    Left,
}

impl Edge {
    /// Left or right.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::Left | Edge::Right)
    }
}

/// CSS-derived margin, border and padding of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxModel {
    /// Margin widths; may be negative.
    pub margin: EdgeSizes,
    /// Border widths, zero where the border style is `none`.
    pub border: EdgeSizes,
    /// Padding widths.
    pub padding: EdgeSizes,
}

impl BoxModel {
    /// The CSS value behind an adjustable region.
    #[must_use]
    pub fn region(&self, region: BoxRegion) -> f32 {
        if region.is_margin() {
            self.margin.get(region.edge())
        } else {
            self.padding.get(region.edge())
        }
    }

    /// Content box of a border box with these edges.
    #[must_use]
    pub fn content_box(&self, border_box: Rect) -> Rect {
        let inset = EdgeSizes {
            top: -(self.border.top + self.padding.top),
            right: -(self.border.right + self.padding.right),
            bottom: -(self.border.bottom + self.padding.bottom),
            left: -(self.border.left + self.padding.left),
        };
        border_box.expanded_by(inset)
    }
}

/// The eight edges that passes may correct after measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum BoxRegion {
    /// `margin-top`
    MarginTop,
    /// `margin-right`
    MarginRight,
    /// `margin-bottom`
    MarginBottom,
    /// `margin-left`
    MarginLeft,
    /// `padding-top`
    PaddingTop,
    /// `padding-right`
    PaddingRight,
    /// `padding-bottom`
    PaddingBottom,
    /// `padding-left`
    PaddingLeft,
}

impl BoxRegion {
    /// All margin regions in top, right, bottom, left order.
    pub const MARGIN: [BoxRegion; 4] = [
        BoxRegion::MarginTop,
        BoxRegion::MarginRight,
        BoxRegion::MarginBottom,
        BoxRegion::MarginLeft,
    ];

    /// All padding regions in top, right, bottom, left order.
    pub const PADDING: [BoxRegion; 4] = [
        BoxRegion::PaddingTop,
        BoxRegion::PaddingRight,
        BoxRegion::PaddingBottom,
        BoxRegion::PaddingLeft,
    ];

    /// Slot in the adjustment arrays.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is a margin edge.
    #[must_use]
    pub fn is_margin(self) -> bool {
        self.index() < 4
    }

    /// The side of the box.
    #[must_use]
    pub fn edge(self) -> Edge {
        match self {
            BoxRegion::MarginTop | BoxRegion::PaddingTop => Edge::Top,
            BoxRegion::MarginRight | BoxRegion::PaddingRight => Edge::Right,
            BoxRegion::MarginBottom | BoxRegion::PaddingBottom => Edge::Bottom,
            BoxRegion::MarginLeft | BoxRegion::PaddingLeft => Edge::Left,
        }
    }

    /// Margin region on `edge`.
    #[must_use]
    pub fn margin(edge: Edge) -> BoxRegion {
        BoxRegion::MARGIN[edge as usize]
    }

    /// Padding region on `edge`.
    #[must_use]
    pub fn padding(edge: Edge) -> BoxRegion {
        BoxRegion::PADDING[edge as usize]
    }
}

/// Partial update for [`crate::NodeTree::set_box`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetBox {
    /// Replace the reset flag.
    pub reset: Option<bool>,
    /// Replace the accumulated adjustment.
    pub adjustment: Option<f32>,
}

impl SetBox {
    /// Discard the CSS value for the region.
    #[must_use]
    pub fn reset() -> Self {
        Self {
            reset: Some(true),
            adjustment: None,
        }
    }

    /// Overwrite the adjustment.
    #[must_use]
    pub fn adjustment(value: f32) -> Self {
        Self {
            reset: None,
            adjustment: Some(value),
        }
    }
}

/// Late corrections to the eight box regions.
///
/// The value emitted for a region is `(reset ? 0 : css) + adjustment`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxAdjustment {
    pub(crate) reset: [bool; 8],
    pub(crate) adjustment: [f32; 8],
}

impl BoxAdjustment {
    /// Whether the CSS value of `region` has been discarded.
    #[must_use]
    pub fn is_reset(&self, region: BoxRegion) -> bool {
        self.reset[region.index()]
    }

    /// Accumulated adjustment for `region`.
    #[must_use]
    pub fn adjustment(&self, region: BoxRegion) -> f32 {
        self.adjustment[region.index()]
    }

    /// Combines the CSS value with the correction.
    #[must_use]
    pub fn resolve(&self, region: BoxRegion, css: f32) -> f32 {
        let base = if self.is_reset(region) { 0.0 } else { css };
        base + self.adjustment(region)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_region_edges() {
        assert_eq!(BoxRegion::margin(Edge::Left), BoxRegion::MarginLeft);
        assert_eq!(BoxRegion::padding(Edge::Bottom), BoxRegion::PaddingBottom);
        assert!(BoxRegion::MarginRight.is_margin());
        assert!(!BoxRegion::PaddingTop.is_margin());
        assert_eq!(BoxRegion::PaddingLeft.to_string(), "padding-left");
    }

    #[test]
    fn test_regions_map_back_to_their_edge() {
        for region in BoxRegion::iter() {
            let expected = if region.is_margin() {
                BoxRegion::margin(region.edge())
            } else {
                BoxRegion::padding(region.edge())
            };
            assert_eq!(expected, region);
        }
        assert_eq!(Edge::iter().filter(|edge| edge.is_horizontal()).count(), 2);
    }

    #[test]
    fn test_content_box() {
        let model = BoxModel {
            border: EdgeSizes { top: 1.0, right: 1.0, bottom: 1.0, left: 1.0 },
            padding: EdgeSizes { top: 4.0, right: 4.0, bottom: 4.0, left: 4.0 },
            ..Default::default()
        };
        let content = model.content_box(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(content, Rect::new(5.0, 5.0, 90.0, 40.0));
    }
}
