//! Break, keep and space properties, and the per-kind applicability table.

use crate::dimension::Length;
use crate::parsers::parse_space_range;
use serde::{Deserialize, Deserializer, Serialize, de};

/// Where content following a forced break must resume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BreakClass {
    #[default]
    Auto,
    Column,
    Page,
    EvenPage,
    OddPage,
}

impl BreakClass {
    pub fn is_auto(&self) -> bool {
        matches!(self, BreakClass::Auto)
    }

    /// Whether this class requires a fresh page rather than a fresh column.
    pub fn needs_new_page(&self) -> bool {
        matches!(
            self,
            BreakClass::Page | BreakClass::EvenPage | BreakClass::OddPage
        )
    }

    /// Checks a page number against an even/odd requirement.
    pub fn accepts_page_number(&self, number: u32) -> bool {
        match self {
            BreakClass::EvenPage => number % 2 == 0,
            BreakClass::OddPage => number % 2 == 1,
            _ => true,
        }
    }
}

/// Keep condition strength: `auto`, `always` or an integer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub enum Keep {
    #[default]
    Auto,
    Strength(u32),
    Always,
}

impl Keep {
    pub fn is_auto(&self) -> bool {
        matches!(self, Keep::Auto)
    }

    /// The stronger of two keep conditions.
    pub fn max(self, other: Keep) -> Keep {
        match (self, other) {
            (Keep::Always, _) | (_, Keep::Always) => Keep::Always,
            (Keep::Strength(a), Keep::Strength(b)) => Keep::Strength(a.max(b)),
            (Keep::Strength(a), Keep::Auto) | (Keep::Auto, Keep::Strength(a)) => {
                Keep::Strength(a)
            }
            (Keep::Auto, Keep::Auto) => Keep::Auto,
        }
    }
}

impl<'de> Deserialize<'de> for Keep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum KeepDef {
            Strength(u32),
            Keyword(String),
        }

        match KeepDef::deserialize(deserializer)? {
            KeepDef::Strength(n) => Ok(Keep::Strength(n)),
            KeepDef::Keyword(k) => match k.as_str() {
                "auto" => Ok(Keep::Auto),
                "always" => Ok(Keep::Always),
                other => other
                    .parse::<u32>()
                    .map(Keep::Strength)
                    .map_err(|_| de::Error::custom(format!("invalid keep value '{}'", other))),
            },
        }
    }
}

/// Precedence of a space specifier. `Force` wins over every integer level.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Precedence {
    Force,
    Level(i32),
}

impl Default for Precedence {
    fn default() -> Self {
        Precedence::Level(0)
    }
}

impl<'de> Deserialize<'de> for Precedence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PrecedenceDef {
            Level(i32),
            Keyword(String),
        }

        match PrecedenceDef::deserialize(deserializer)? {
            PrecedenceDef::Level(n) => Ok(Precedence::Level(n)),
            PrecedenceDef::Keyword(k) if k == "force" => Ok(Precedence::Force),
            PrecedenceDef::Keyword(k) => Err(de::Error::custom(format!(
                "invalid precedence '{}'",
                k
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Conditionality {
    /// Suppressed at the start or end of a page or column.
    #[default]
    Discard,
    Retain,
}

/// `space-before` / `space-after` specifier.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub struct Space {
    pub minimum: Length,
    pub optimum: Length,
    pub maximum: Length,
    pub precedence: Precedence,
    pub conditionality: Conditionality,
}

impl Space {
    pub fn fixed(optimum: Length) -> Self {
        Self {
            minimum: optimum,
            optimum,
            maximum: optimum,
            ..Default::default()
        }
    }

    pub fn range(minimum: Length, optimum: Length, maximum: Length) -> Self {
        Self {
            minimum,
            optimum,
            maximum,
            ..Default::default()
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn retained(mut self) -> Self {
        self.conditionality = Conditionality::Retain;
        self
    }

    pub fn is_zero(&self) -> bool {
        self.minimum == Length::ZERO && self.optimum == Length::ZERO && self.maximum == Length::ZERO
    }
}

impl<'de> Deserialize<'de> for Space {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SpaceDef {
            Points(f32),
            Shorthand(String),
            Full {
                #[serde(default)]
                minimum: Option<Length>,
                optimum: Length,
                #[serde(default)]
                maximum: Option<Length>,
                #[serde(default)]
                precedence: Precedence,
                #[serde(default)]
                conditionality: Conditionality,
            },
        }

        match SpaceDef::deserialize(deserializer)? {
            SpaceDef::Points(points) => Ok(Space::fixed(Length::pt(points))),
            SpaceDef::Shorthand(s) => {
                let (min, opt, max) = parse_space_range(&s).map_err(de::Error::custom)?;
                Ok(Space::range(min.into(), opt.into(), max.into()))
            }
            SpaceDef::Full {
                minimum,
                optimum,
                maximum,
                precedence,
                conditionality,
            } => {
                let minimum = minimum.unwrap_or(optimum);
                let maximum = maximum.unwrap_or(optimum);
                if minimum > optimum || optimum > maximum {
                    return Err(de::Error::custom(
                        "space requires minimum <= optimum <= maximum",
                    ));
                }
                Ok(Space {
                    minimum,
                    optimum,
                    maximum,
                    precedence,
                    conditionality,
                })
            }
        }
    }
}

/// Formatting properties the flow tree understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Id,
    BreakBefore,
    BreakAfter,
    KeepTogether,
    KeepWithNext,
    KeepWithPrevious,
    SpaceBefore,
    SpaceAfter,
    Padding,
    Border,
    Background,
    Markers,
    Widows,
    Orphans,
    TextAlign,
    LineHeight,
    MinHeight,
}

/// Flow object kinds, used to look up which properties apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Block,
    Paragraph,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Image,
    PageBreak,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Block => "block",
            FlowKind::Paragraph => "paragraph",
            FlowKind::List => "list",
            FlowKind::ListItem => "list-item",
            FlowKind::Table => "table",
            FlowKind::TableRow => "table-row",
            FlowKind::TableCell => "table-cell",
            FlowKind::Image => "image",
            FlowKind::PageBreak => "page-break",
        }
    }
}

use Property::*;

const BLOCK_LEVEL: &[Property] = &[
    Id,
    BreakBefore,
    BreakAfter,
    KeepTogether,
    KeepWithNext,
    KeepWithPrevious,
    SpaceBefore,
    SpaceAfter,
    Padding,
    Border,
    Background,
    Markers,
];

const PARAGRAPH: &[Property] = &[
    Id,
    BreakBefore,
    BreakAfter,
    KeepTogether,
    KeepWithNext,
    KeepWithPrevious,
    SpaceBefore,
    SpaceAfter,
    Padding,
    Border,
    Background,
    Markers,
    Widows,
    Orphans,
    TextAlign,
    LineHeight,
];

const TABLE_ROW: &[Property] = &[Id, KeepTogether, KeepWithNext, KeepWithPrevious, MinHeight];

const TABLE_CELL: &[Property] = &[Id, Padding, Border, Background, Markers];

const IMAGE: &[Property] = &[
    Id,
    BreakBefore,
    BreakAfter,
    KeepWithNext,
    KeepWithPrevious,
    SpaceBefore,
    SpaceAfter,
];

const PAGE_BREAK: &[Property] = &[];

/// Properties that have an effect on a flow object of the given kind.
pub const fn applicable_properties(kind: FlowKind) -> &'static [Property] {
    match kind {
        FlowKind::Block | FlowKind::List | FlowKind::ListItem | FlowKind::Table => BLOCK_LEVEL,
        FlowKind::Paragraph => PARAGRAPH,
        FlowKind::TableRow => TABLE_ROW,
        FlowKind::TableCell => TABLE_CELL,
        FlowKind::Image => IMAGE,
        FlowKind::PageBreak => PAGE_BREAK,
    }
}

pub fn applies(kind: FlowKind, property: Property) -> bool {
    applicable_properties(kind).contains(&property)
}
