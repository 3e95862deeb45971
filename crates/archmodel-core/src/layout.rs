//! Renderer-facing layout values
//!
//! The model never computes layout. These types only carry what an external
//! renderer produced so it can be stored, serialized, and copied between
//! workspaces.

use serde::{Deserialize, Serialize};

/// A routing point on a relationship line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// How a relationship line is drawn between its vertices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Routing {
    #[default]
    Direct,
    Curved,
    Orthogonal,
}

/// Direction in which an automatic layout engine ranks elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankDirection {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

/// Page size of a rendered view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize {
    #[serde(rename = "A6_Portrait")]
    A6Portrait,
    #[serde(rename = "A6_Landscape")]
    A6Landscape,
    #[serde(rename = "A5_Portrait")]
    A5Portrait,
    #[serde(rename = "A5_Landscape")]
    A5Landscape,
    #[serde(rename = "A4_Portrait")]
    A4Portrait,
    #[serde(rename = "A4_Landscape")]
    A4Landscape,
    #[serde(rename = "A3_Portrait")]
    A3Portrait,
    #[serde(rename = "A3_Landscape")]
    A3Landscape,
    #[serde(rename = "A2_Portrait")]
    A2Portrait,
    #[serde(rename = "A2_Landscape")]
    A2Landscape,
    #[serde(rename = "A1_Portrait")]
    A1Portrait,
    #[serde(rename = "A1_Landscape")]
    A1Landscape,
    #[serde(rename = "A0_Portrait")]
    A0Portrait,
    #[serde(rename = "A0_Landscape")]
    A0Landscape,
    #[serde(rename = "Letter_Portrait")]
    LetterPortrait,
    #[serde(rename = "Letter_Landscape")]
    LetterLandscape,
    #[serde(rename = "Legal_Portrait")]
    LegalPortrait,
    #[serde(rename = "Legal_Landscape")]
    LegalLandscape,
    #[serde(rename = "Slide_4_3")]
    Slide4x3,
    #[serde(rename = "Slide_16_9")]
    Slide16x9,
    #[serde(rename = "Slide_16_10")]
    Slide16x10,
}

impl PaperSize {
    /// Returns the width and height in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::A6Portrait => (1240, 1748),
            Self::A6Landscape => (1748, 1240),
            Self::A5Portrait => (1748, 2480),
            Self::A5Landscape => (2480, 1748),
            Self::A4Portrait => (2480, 3508),
            Self::A4Landscape => (3508, 2480),
            Self::A3Portrait => (3508, 4961),
            Self::A3Landscape => (4961, 3508),
            Self::A2Portrait => (4961, 7016),
            Self::A2Landscape => (7016, 4961),
            Self::A1Portrait => (7016, 9933),
            Self::A1Landscape => (9933, 7016),
            Self::A0Portrait => (9933, 14043),
            Self::A0Landscape => (14043, 9933),
            Self::LetterPortrait => (2550, 3300),
            Self::LetterLandscape => (3300, 2550),
            Self::LegalPortrait => (2550, 4200),
            Self::LegalLandscape => (4200, 2550),
            Self::Slide4x3 => (3306, 2480),
            Self::Slide16x9 => (3508, 1973),
            Self::Slide16x10 => (3508, 2193),
        }
    }

    pub fn width(self) -> u32 {
        self.dimensions().0
    }

    pub fn height(self) -> u32 {
        self.dimensions().1
    }

    pub fn is_landscape(self) -> bool {
        let (width, height) = self.dimensions();
        width > height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_size_orientation() {
        assert!(!PaperSize::A4Portrait.is_landscape());
        assert!(PaperSize::A4Landscape.is_landscape());
        assert!(PaperSize::Slide16x9.is_landscape());
        assert_eq!(PaperSize::A5Landscape.width(), PaperSize::A5Portrait.height());
    }

    #[test]
    fn test_paper_size_serializes_with_key() {
        let json = serde_json::to_string(&PaperSize::A4Portrait).unwrap();
        assert_eq!(json, "\"A4_Portrait\"");
        let parsed: PaperSize = serde_json::from_str("\"Slide_16_10\"").unwrap();
        assert_eq!(parsed, PaperSize::Slide16x10);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Routing::default(), Routing::Direct);
        assert_eq!(RankDirection::default(), RankDirection::TopBottom);
        assert_eq!(Vertex::new(1, 2), Vertex { x: 1, y: 2 });
    }
}
