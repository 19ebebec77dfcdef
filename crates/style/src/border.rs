use crate::dimension::{Edges, Length};
use crate::parsers::parse_border;
use folio_types::Color;
use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub width: Length,
    pub style: BorderStyle,
    pub color: Color,
}

impl Border {
    /// Width that takes up space; a `none` border occupies nothing.
    pub fn effective_width(&self) -> Length {
        match self.style {
            BorderStyle::None => Length::ZERO,
            _ => self.width,
        }
    }
}

impl<'de> Deserialize<'de> for Border {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum BorderDef {
            Shorthand(String),
            Map {
                width: Length,
                #[serde(default)]
                style: BorderStyle,
                #[serde(default)]
                color: Color,
            },
        }

        match BorderDef::deserialize(deserializer)? {
            BorderDef::Shorthand(s) => parse_border(&s).map_err(de::Error::custom),
            BorderDef::Map {
                width,
                style,
                color,
            } => Ok(Border {
                width,
                style,
                color,
            }),
        }
    }
}

/// Borders of the separate border model: every side is independent and
/// nothing collapses with neighbouring cells.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub struct Borders {
    pub before: Option<Border>,
    pub end: Option<Border>,
    pub after: Option<Border>,
    pub start: Option<Border>,
}

impl Borders {
    pub fn uniform(border: Border) -> Self {
        Self {
            before: Some(border),
            end: Some(border),
            after: Some(border),
            start: Some(border),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sides().iter().all(|side| side.is_none())
    }

    /// Side widths, `[before, end, after, start]`.
    pub fn widths(&self) -> Edges {
        let width = |side: Option<Border>| side.map(|b| b.effective_width()).unwrap_or_default();
        Edges {
            before: width(self.before),
            end: width(self.end),
            after: width(self.after),
            start: width(self.start),
        }
    }

    pub fn sides(&self) -> [Option<Border>; 4] {
        [self.before, self.end, self.after, self.start]
    }
}

impl<'de> Deserialize<'de> for Borders {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum BordersDef {
            Uniform(Border),
            Sides {
                #[serde(default)]
                before: Option<Border>,
                #[serde(default)]
                end: Option<Border>,
                #[serde(default)]
                after: Option<Border>,
                #[serde(default)]
                start: Option<Border>,
            },
        }

        Ok(match BordersDef::deserialize(deserializer)? {
            BordersDef::Uniform(border) => Borders::uniform(border),
            BordersDef::Sides {
                before,
                end,
                after,
                start,
            } => Borders {
                before,
                end,
                after,
                start,
            },
        })
    }
}
