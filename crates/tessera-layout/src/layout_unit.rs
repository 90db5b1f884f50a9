//! Layout descriptors.
//!
//! A [`LayoutUnit`] pairs a node with the container kind it renders as and
//! the arrangement hints for its children. The controller branches on the
//! container type alone; alignment bits are additive hints that later passes
//! and sibling extensions may inspect.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use strum_macros::{Display, EnumString};

use crate::node::NodeId;

/// The target primitive a node renders as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ContainerType {
    /// Not yet classified.
    #[default]
    Unknown,
    /// Children positioned by anchors to the parent and to each other.
    Constraint,
    /// Children positioned relative to the parent or preceding siblings.
    Relative,
    /// Children stacked on one axis.
    Linear,
    /// Children placed in rows and columns.
    Grid,
    /// Children layered on top of each other.
    Frame,
    /// Grouped radio buttons.
    RadioGroup,
    /// Text leaf.
    Text,
    /// Image leaf.
    Image,
    /// Editable text field.
    Edit,
    /// Push button.
    Button,
    /// Checkbox.
    Checkbox,
    /// Radio button.
    Radio,
    /// Drop-down selection.
    Select,
    /// Slider.
    Range,
    /// Horizontal rule.
    Line,
    /// Empty spacer.
    Space,
    /// Embedded web content.
    Web,
}

impl ContainerType {
    /// Whether the node hosts rendered children.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ContainerType::Constraint
                | ContainerType::Relative
                | ContainerType::Linear
                | ContainerType::Grid
                | ContainerType::Frame
                | ContainerType::RadioGroup
        )
    }

    /// Whether the node displays text content.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(
            self,
            ContainerType::Text
                | ContainerType::Button
                | ContainerType::Checkbox
                | ContainerType::Radio
                | ContainerType::Edit
        )
    }
}

/// Additive arrangement hints.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Alignment(u32);

impl Alignment {
    /// No hints.
    pub const NONE: Alignment = Alignment(0);
    /// Positions derived from measured geometry.
    pub const AUTO_LAYOUT: Alignment = Alignment(1);
    /// Children flow left to right.
    pub const HORIZONTAL: Alignment = Alignment(1 << 1);
    /// Children flow top to bottom.
    pub const VERTICAL: Alignment = Alignment(1 << 2);
    /// Children are absolutely positioned.
    pub const ABSOLUTE: Alignment = Alignment(1 << 3);
    /// Exactly one child.
    pub const SINGLE: Alignment = Alignment(1 << 4);
    /// The node is a synthetic wrapper.
    pub const WRAPPER: Alignment = Alignment(1 << 5);
    /// Children are split into independent segments.
    pub const SEGMENTED: Alignment = Alignment(1 << 6);
    /// Children contain floats.
    pub const FLOAT: Alignment = Alignment(1 << 7);
    /// Children sized by percentage.
    pub const PERCENT: Alignment = Alignment(1 << 8);
    /// Inline content wraps over several lines.
    pub const MULTILINE: Alignment = Alignment(1 << 9);
    /// Children distributed into columns.
    pub const COLUMN: Alignment = Alignment(1 << 10);
    /// Children share a text baseline.
    pub const BASELINE: Alignment = Alignment(1 << 11);

    const NAMES: [(Alignment, &'static str); 12] = [
        (Self::AUTO_LAYOUT, "AUTO_LAYOUT"),
        (Self::HORIZONTAL, "HORIZONTAL"),
        (Self::VERTICAL, "VERTICAL"),
        (Self::ABSOLUTE, "ABSOLUTE"),
        (Self::SINGLE, "SINGLE"),
        (Self::WRAPPER, "WRAPPER"),
        (Self::SEGMENTED, "SEGMENTED"),
        (Self::FLOAT, "FLOAT"),
        (Self::PERCENT, "PERCENT"),
        (Self::MULTILINE, "MULTILINE"),
        (Self::COLUMN, "COLUMN"),
        (Self::BASELINE, "BASELINE"),
    ];

    /// Whether every bit of `other` is set.
    #[must_use]
    pub fn contains(self, other: Alignment) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Clears the bits of `other`.
    #[must_use]
    pub fn without(self, other: Alignment) -> Alignment {
        Alignment(self.0 & !other.0)
    }

    /// Whether no bits are set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Alignment {
    type Output = Alignment;

    fn bitor(self, rhs: Alignment) -> Alignment {
        Alignment(self.0 | rhs.0)
    }
}

impl BitOrAssign for Alignment {
    fn bitor_assign(&mut self, rhs: Alignment) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join(" | "))
        }
    }
}

/// A classified node ready to be rendered by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutUnit {
    /// Render parent.
    pub parent: NodeId,
    /// The node being rendered.
    pub node: NodeId,
    /// Target primitive.
    pub container_type: ContainerType,
    /// Arrangement hints.
    pub alignment: Alignment,
    /// Children in render order.
    pub children: Vec<NodeId>,
    /// Row count for grid-like containers.
    pub row_count: Option<usize>,
    /// Column count for grid-like containers.
    pub column_count: Option<usize>,
}

impl LayoutUnit {
    /// Creates an unclassified unit.
    #[must_use]
    pub fn new(parent: NodeId, node: NodeId, children: Vec<NodeId>) -> Self {
        Self {
            parent,
            node,
            container_type: ContainerType::Unknown,
            alignment: Alignment::NONE,
            children,
            row_count: None,
            column_count: None,
        }
    }

    /// Sets the container type and alignment.
    #[must_use]
    pub fn with_container(mut self, container_type: ContainerType, alignment: Alignment) -> Self {
        self.container_type = container_type;
        self.alignment = alignment;
        self
    }

    /// Sets the grid dimensions.
    #[must_use]
    pub fn with_grid(mut self, rows: usize, columns: usize) -> Self {
        self.row_count = Some(rows);
        self.column_count = Some(columns);
        self
    }

    /// Adds alignment hints.
    pub fn add(&mut self, alignment: Alignment) {
        self.alignment |= alignment;
    }

    /// Whether all hints in `alignment` are present.
    #[must_use]
    pub fn has(&self, alignment: Alignment) -> bool {
        self.alignment.contains(alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_bits() {
        let mut alignment = Alignment::HORIZONTAL | Alignment::SINGLE;
        assert!(alignment.contains(Alignment::HORIZONTAL));
        assert!(!alignment.contains(Alignment::VERTICAL));
        assert!(!alignment.contains(Alignment::NONE));
        alignment |= Alignment::WRAPPER;
        assert_eq!(format!("{alignment:?}"), "HORIZONTAL | SINGLE | WRAPPER");
        assert_eq!(
            alignment.without(Alignment::SINGLE),
            Alignment::HORIZONTAL | Alignment::WRAPPER
        );
    }

    #[test]
    fn test_container_display() {
        assert_eq!(ContainerType::RadioGroup.to_string(), "radio_group");
        assert!(ContainerType::Grid.is_container());
        assert!(!ContainerType::Text.is_container());
    }
}
