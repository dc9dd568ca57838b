use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A filter highlight color.
///
/// The named variants form the fixed palette new filter tabs cycle through;
/// `Transparent` is the palette's "no fill" entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Navy,
    Purple,
    Gray,
    LightGray,
    Transparent,
    Rgb(u8, u8, u8),
}

/// The palette in display order. The last entry is the no-fill color.
pub const PALETTE: [Color; 12] = [
    Color::Black,
    Color::White,
    Color::Red,
    Color::Orange,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Navy,
    Color::Purple,
    Color::Gray,
    Color::LightGray,
    Color::Transparent,
];

impl Color {
    /// Default foreground for the `n`-th filter tab.
    ///
    /// Wraps around the palette and never yields the no-fill entry.
    pub fn default_foreground(n: usize) -> Color {
        let fills = &PALETTE[..PALETTE.len() - 1];
        fills[n % fills.len()]
    }

    pub fn is_transparent(self) -> bool {
        self == Color::Transparent
    }

    /// RGB value used by terminal renderers, `None` for the no-fill color.
    pub fn rgb(self) -> Option<(u8, u8, u8)> {
        let rgb = match self {
            Color::Black => (0, 0, 0),
            Color::White => (255, 255, 255),
            Color::Red => (255, 0, 0),
            Color::Orange => (255, 165, 0),
            Color::Yellow => (255, 255, 0),
            Color::Green => (50, 205, 50),
            Color::Blue => (0, 191, 255),
            Color::Navy => (0, 0, 128),
            Color::Purple => (147, 112, 219),
            Color::Gray => (128, 128, 128),
            Color::LightGray => (211, 211, 211),
            Color::Transparent => return None,
            Color::Rgb(r, g, b) => (r, g, b),
        };
        Some(rgb)
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Color::Black => "black",
            Color::White => "white",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Navy => "navy",
            Color::Purple => "purple",
            Color::Gray => "gray",
            Color::LightGray => "light_gray",
            Color::Transparent => "transparent",
            Color::Rgb(..) => return None,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self) {
            (Some(name), _) => f.write_str(name),
            (None, Color::Rgb(r, g, b)) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            (None, _) => Ok(()),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse a color string.
    ///
    /// Supports:
    /// - Palette names: `red`, `light_gray`, `Light Gray`, etc.
    /// - Hex: `#rrggbb` or `#rgb`
    /// - `none` / `default` → `Transparent`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex_color(hex);
        }
        parse_named_color(s)
    }
}

fn parse_hex_color(hex: &str) -> Result<Color, String> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(|| format!("invalid hex color: #{}", hex))
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(format!("invalid hex color: #{}", hex)),
    }
}

fn parse_named_color(s: &str) -> Result<Color, String> {
    let normalized: String = s
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase();
    match normalized.as_str() {
        "black" => Ok(Color::Black),
        "white" => Ok(Color::White),
        "red" => Ok(Color::Red),
        "orange" => Ok(Color::Orange),
        "yellow" => Ok(Color::Yellow),
        "green" => Ok(Color::Green),
        "blue" => Ok(Color::Blue),
        "navy" => Ok(Color::Navy),
        "purple" => Ok(Color::Purple),
        "gray" | "grey" => Ok(Color::Gray),
        "lightgray" | "lightgrey" => Ok(Color::LightGray),
        "transparent" | "none" | "default" => Ok(Color::Transparent),
        _ => Err(format!("unknown color: {}", s)),
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
