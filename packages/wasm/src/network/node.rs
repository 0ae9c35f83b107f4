//! Node identifiers and colours.
//!
//! Nodes are the drifting points of the network. Each node has:
//! - An index into the SoA buffers of the spatial store
//! - A colour class inherited by the edges it anchors
//! - A pulse phase that offsets its glow animation

use std::fmt;

/// Index of a node in the spatial store.
///
/// The population is fixed for an engine's lifetime, so ids are dense and
/// never invalidated before teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into the SoA buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xffffff);

    /// Build a colour from a 0xRRGGBB literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// CSS `rgba()` string with the given alpha.
    pub fn to_css(self, alpha: f32) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }
}

/// Colour family a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    Cyan,
    Blue,
}

impl ColorClass {
    /// Probability that a freshly spawned node is cyan.
    pub const CYAN_PROBABILITY: f64 = 0.4;

    /// Display colour for the class.
    pub fn rgb(self) -> Rgb {
        match self {
            ColorClass::Cyan => Rgb::from_hex(0x0fb6d4),
            ColorClass::Blue => Rgb::from_hex(0x3b82f6),
        }
    }
}
