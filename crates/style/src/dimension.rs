//! Lengths, page sizes and four-sided edge values.
use crate::parsers::{length_mpt, parse_edges};
use folio_types::{Mpt, Size, from_pt};
use serde::{Deserialize, Deserializer, Serialize, de};

/// A length resolved to millipoints. Deserializes from a number (points) or
/// a string with a unit.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Length(pub Mpt);

impl Length {
    pub const ZERO: Length = Length(0);

    pub fn pt(points: f32) -> Self {
        Length(from_pt(points))
    }

    pub fn mpt(self) -> Mpt {
        self.0
    }
}

impl From<Mpt> for Length {
    fn from(value: Mpt) -> Self {
        Length(value)
    }
}

impl<'de> Deserialize<'de> for Length {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum LengthDef {
            Points(f32),
            Str(String),
        }

        match LengthDef::deserialize(deserializer)? {
            LengthDef::Points(points) => Ok(Length::pt(points)),
            LengthDef::Str(s) => length_mpt(&s).map(Length).map_err(de::Error::custom),
        }
    }
}

/// Values for the four sides of a box, in writing-mode relative terms.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edges {
    pub before: Length,
    pub end: Length,
    pub after: Length,
    pub start: Length,
}

impl Edges {
    pub fn all(value: Length) -> Self {
        Self {
            before: value,
            end: value,
            after: value,
            start: value,
        }
    }

    /// Sum of the start and end sides.
    pub fn inline(&self) -> Mpt {
        self.start.mpt() + self.end.mpt()
    }

    /// Sum of the before and after sides.
    pub fn block(&self) -> Mpt {
        self.before.mpt() + self.after.mpt()
    }
}

impl<'de> Deserialize<'de> for Edges {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum EdgesDef {
            Points(f32),
            Shorthand(String),
            Map {
                #[serde(default)]
                before: Length,
                #[serde(default)]
                end: Length,
                #[serde(default)]
                after: Length,
                #[serde(default)]
                start: Length,
            },
        }

        match EdgesDef::deserialize(deserializer)? {
            EdgesDef::Points(points) => Ok(Edges::all(Length::pt(points))),
            EdgesDef::Shorthand(s) => {
                let [before, end, after, start] = parse_edges(&s).map_err(de::Error::custom)?;
                Ok(Edges {
                    before: before.into(),
                    end: end.into(),
                    after: after.into(),
                    start: start.into(),
                })
            }
            EdgesDef::Map {
                before,
                end,
                after,
                start,
            } => Ok(Edges {
                before,
                end,
                after,
                start,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    Custom {
        width: Length,
        height: Length,
    },
}

impl PageSize {
    pub fn dimensions(&self) -> Size {
        match self {
            PageSize::A4 => Size::new(from_pt(595.28), from_pt(841.89)),
            PageSize::Letter => Size::new(from_pt(612.0), from_pt(792.0)),
            PageSize::Legal => Size::new(from_pt(612.0), from_pt(1008.0)),
            PageSize::Custom { width, height } => Size::new(width.mpt(), height.mpt()),
        }
    }

    fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(format!("Unknown page size: {}", s)),
        }
    }
}

impl Serialize for PageSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        match self {
            PageSize::A4 => serializer.serialize_str("A4"),
            PageSize::Letter => serializer.serialize_str("Letter"),
            PageSize::Legal => serializer.serialize_str("Legal"),
            PageSize::Custom { width, height } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("width", width)?;
                map.serialize_entry("height", height)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PageSizeDef {
            Named(String),
            Custom { width: Length, height: Length },
        }

        match PageSizeDef::deserialize(deserializer)? {
            PageSizeDef::Named(s) => Self::parse(&s).map_err(de::Error::custom),
            PageSizeDef::Custom { width, height } => Ok(PageSize::Custom { width, height }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_from_number_or_string() {
        let l: Length = serde_json::from_str("12").unwrap();
        assert_eq!(l.mpt(), 12_000);
        let l: Length = serde_json::from_str("\"1in\"").unwrap();
        assert_eq!(l.mpt(), 72_000);
        assert!(serde_json::from_str::<Length>("\"wide\"").is_err());
    }

    #[test]
    fn edges_shorthand_and_map() {
        let e: Edges = serde_json::from_str("\"10pt 20pt\"").unwrap();
        assert_eq!(e.block(), 20_000);
        assert_eq!(e.inline(), 40_000);
        let e: Edges = serde_json::from_str(r#"{"before": 5}"#).unwrap();
        assert_eq!(e.before.mpt(), 5_000);
        assert_eq!(e.after, Length::ZERO);
    }

    #[test]
    fn page_sizes() {
        let s: PageSize = serde_json::from_str("\"letter\"").unwrap();
        assert_eq!(s.dimensions(), Size::new(612_000, 792_000));
        let s: PageSize = serde_json::from_str(r#"{"width": 100, "height": "2in"}"#).unwrap();
        assert_eq!(s.dimensions(), Size::new(100_000, 144_000));
    }
}
