use serde::{Deserialize, Deserializer, Serialize, de};

/// An opaque RGB color used for backgrounds and borders.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value }
    }

    /// Components scaled to the `0.0..=1.0` range painters expect.
    pub fn unit_rgb(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn parse_hex(s: &str) -> Result<Color, String> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("Color must start with #, got: {}", s))?;
        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|e| format!("Invalid color '{}': {}", s, e))
        };
        match hex.len() {
            3 => Ok(Color {
                r: channel(&hex[0..1].repeat(2))?,
                g: channel(&hex[1..2].repeat(2))?,
                b: channel(&hex[2..3].repeat(2))?,
            }),
            6 => Ok(Color {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            n => Err(format!("Invalid hex color length: expected 3 or 6, got {}", n)),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map { r: u8, g: u8, b: u8 },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => Self::parse_hex(&s).map_err(de::Error::custom),
            ColorDef::Map { r, g, b } => Ok(Color { r, g, b }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Color::parse_hex("#fff").unwrap(), Color::gray(255));
        assert_eq!(
            Color::parse_hex("#102030").unwrap(),
            Color { r: 0x10, g: 0x20, b: 0x30 }
        );
        assert!(Color::parse_hex("102030").is_err());
        assert!(Color::parse_hex("#12345").is_err());
    }

    #[test]
    fn deserializes_from_string_or_map() {
        let c: Color = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(c, Color { r: 255, g: 0, b: 0 });
        let c: Color = serde_json::from_str(r#"{"r":1,"g":2,"b":3}"#).unwrap();
        assert_eq!(c, Color { r: 1, g: 2, b: 3 });
    }
}
