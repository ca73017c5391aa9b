//! Connection handles on node boundaries.
//!
//! Every node exposes one source handle and one target handle per side. The
//! host canvas identifies them by string ids: source handles use the bare side
//! name (`"right"`), target handles append a `-target` suffix (`"left-target"`).

use std::fmt;

use serde::{Deserialize, Serialize, Serializer, de};

use crate::geometry::{Point, Size};

/// A side of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Returns the side name used in handle ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Side::Top),
            "right" => Some(Side::Right),
            "bottom" => Some(Side::Bottom),
            "left" => Some(Side::Left),
            _ => None,
        }
    }

    /// Returns the midpoint of this side for a box at `position` with `size`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use draftboard_core::{geometry::{Point, Size}, handle::Side};
    /// let anchor = Side::Right.anchor(Point::new(0.0, 0.0), Size::new(180.0, 50.0));
    /// assert_eq!(anchor, Point::new(180.0, 25.0));
    /// ```
    pub fn anchor(self, position: Point, size: Size) -> Point {
        let center = position.center_of(size);
        match self {
            Side::Top => center.with_y(position.y()),
            Side::Bottom => center.with_y(position.y() + size.height()),
            Side::Left => center.with_x(position.x()),
            Side::Right => center.with_x(position.x() + size.width()),
        }
    }

    /// Returns `true` for the left and right sides.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// The handle an edge leaves its source node from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub Side);

/// The handle an edge enters its target node through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle(pub Side);

impl SourceHandle {
    pub fn side(self) -> Side {
        self.0
    }
}

impl TargetHandle {
    pub fn side(self) -> Side {
        self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-target", self.0.as_str())
    }
}

impl Serialize for SourceHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for TargetHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SourceHandle {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Side::parse(&id)
            .map(SourceHandle)
            .ok_or_else(|| de::Error::custom(format!("unknown source handle `{id}`")))
    }
}

impl<'de> Deserialize<'de> for TargetHandle {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.strip_suffix("-target")
            .and_then(Side::parse)
            .map(TargetHandle)
            .ok_or_else(|| de::Error::custom(format!("unknown target handle `{id}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ids() {
        assert_eq!(SourceHandle(Side::Bottom).to_string(), "bottom");
        assert_eq!(TargetHandle(Side::Top).to_string(), "top-target");
        assert_eq!(TargetHandle(Side::Left).to_string(), "left-target");
    }

    #[test]
    fn test_target_handle_parse() {
        let handle: TargetHandle = serde_json::from_str("\"right-target\"").unwrap();
        assert_eq!(handle, TargetHandle(Side::Right));

        let bad: Result<TargetHandle, _> = serde_json::from_str("\"right\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_side_anchors() {
        let position = Point::new(10.0, 20.0);
        let size = Size::new(100.0, 40.0);
        assert_eq!(Side::Top.anchor(position, size), Point::new(60.0, 20.0));
        assert_eq!(Side::Bottom.anchor(position, size), Point::new(60.0, 60.0));
        assert_eq!(Side::Left.anchor(position, size), Point::new(10.0, 40.0));
        assert_eq!(Side::Right.anchor(position, size), Point::new(110.0, 40.0));
    }
}
