//! Flow content tree.
//!
//! This is the tree a markup front-end hands to the formatter: page
//! sequences whose flows hold blocks, paragraphs, lists and tables, each
//! carrying the break, keep and space properties layout needs.

mod validate;

pub use validate::ValidationIssue;

use folio_style::{
    BreakClass, Edges, FlowKind, Keep, Length, PageMaster, Property, SequenceMasters, Space,
    Borders, TextAlign,
};
use folio_types::{Color, RefId};
use serde::{Deserialize, Deserializer, Serialize, de};

/// A marker attached to a flow object, retrievable from static content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub class_name: String,
    pub text: String,
}

/// Properties shared by every block-level flow object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetadata {
    pub id: Option<RefId>,
    pub break_before: BreakClass,
    pub break_after: BreakClass,
    pub keep_together: Keep,
    pub keep_with_next: Keep,
    pub keep_with_previous: Keep,
    pub space_before: Space,
    pub space_after: Space,
    pub padding: Edges,
    pub border: Borders,
    pub background: Option<Color>,
    pub markers: Vec<Marker>,
}

impl NodeMetadata {
    pub fn with_id(id: impl Into<RefId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Properties that differ from their initial value.
    pub fn specified_properties(&self) -> Vec<Property> {
        let mut set = Vec::new();
        let mut check = |specified: bool, property| {
            if specified {
                set.push(property);
            }
        };
        check(self.id.is_some(), Property::Id);
        check(!self.break_before.is_auto(), Property::BreakBefore);
        check(!self.break_after.is_auto(), Property::BreakAfter);
        check(!self.keep_together.is_auto(), Property::KeepTogether);
        check(!self.keep_with_next.is_auto(), Property::KeepWithNext);
        check(!self.keep_with_previous.is_auto(), Property::KeepWithPrevious);
        check(!self.space_before.is_zero(), Property::SpaceBefore);
        check(!self.space_after.is_zero(), Property::SpaceAfter);
        check(self.padding != Edges::default(), Property::Padding);
        check(!self.border.is_empty(), Property::Border);
        check(self.background.is_some(), Property::Background);
        check(!self.markers.is_empty(), Property::Markers);
        set
    }
}

fn default_font_size() -> Length {
    Length::pt(12.0)
}

fn default_widows() -> u32 {
    2
}

/// Line-level properties of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    #[serde(default = "default_font_size")]
    pub font_size: Length,
    /// Distance between baselines; 1.2 times the font size when absent.
    #[serde(default)]
    pub line_height: Option<Length>,
    /// How much each line's height may grow or shrink when a page is justified.
    #[serde(default)]
    pub line_height_adjust: Length,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default = "default_widows")]
    pub widows: u32,
    #[serde(default = "default_widows")]
    pub orphans: u32,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            line_height: None,
            line_height_adjust: Length::ZERO,
            text_align: TextAlign::Start,
            widows: 2,
            orphans: 2,
        }
    }
}

impl ParagraphStyle {
    pub fn resolved_line_height(&self) -> Length {
        self.line_height
            .unwrap_or(Length(self.font_size.mpt() * 6 / 5))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InlineNode {
    Text {
        text: String,
    },
    /// The number of the page holding the flow object `target`. With `last`
    /// set, the last page the object occupies.
    PageCitation {
        target: RefId,
        #[serde(default)]
        last: bool,
    },
    /// Text that links to the flow object `target`.
    Link {
        target: RefId,
        children: Vec<InlineNode>,
    },
    LineBreak,
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text { text: text.into() }
    }
}

/// Width of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ColumnWidth {
    Fixed(Length),
    /// A share of the width left after fixed columns ("2*"; "auto" is "1*").
    Proportional(f32),
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColumnDef {
            Points(f32),
            Str(String),
        }

        match ColumnDef::deserialize(deserializer)? {
            ColumnDef::Points(points) => Ok(ColumnWidth::Fixed(Length::pt(points))),
            ColumnDef::Str(s) if s == "auto" => Ok(ColumnWidth::Proportional(1.0)),
            ColumnDef::Str(s) => match s.strip_suffix('*') {
                Some("") => Ok(ColumnWidth::Proportional(1.0)),
                Some(factor) => factor
                    .trim()
                    .parse::<f32>()
                    .map(ColumnWidth::Proportional)
                    .map_err(de::Error::custom),
                None => folio_style::parsers::length_mpt(&s)
                    .map(|mpt| ColumnWidth::Fixed(Length(mpt)))
                    .map_err(de::Error::custom),
            },
        }
    }
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub meta: NodeMetadata,
    #[serde(default = "one")]
    pub col_span: u32,
    #[serde(default = "one")]
    pub row_span: u32,
    #[serde(default)]
    pub children: Vec<FlowNode>,
}

impl TableCell {
    pub fn new(children: Vec<FlowNode>) -> Self {
        Self {
            meta: NodeMetadata::default(),
            col_span: 1,
            row_span: 1,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub meta: NodeMetadata,
    /// Minimum block-progression extent of the row.
    #[serde(default)]
    pub height: Option<Length>,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    #[serde(default)]
    pub meta: NodeMetadata,
    pub label: Vec<FlowNode>,
    pub body: Vec<FlowNode>,
}

fn default_label_width() -> Length {
    Length::pt(18.0)
}

fn default_repeat() -> bool {
    true
}

fn default_break_class() -> BreakClass {
    BreakClass::Page
}

/// A block-level flow object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FlowNode {
    Block {
        #[serde(default)]
        meta: NodeMetadata,
        #[serde(default)]
        children: Vec<FlowNode>,
    },
    Paragraph {
        #[serde(default)]
        meta: NodeMetadata,
        #[serde(default)]
        style: ParagraphStyle,
        inlines: Vec<InlineNode>,
    },
    List {
        #[serde(default)]
        meta: NodeMetadata,
        /// Width reserved for item labels.
        #[serde(default = "default_label_width")]
        indent: Length,
        items: Vec<ListItem>,
    },
    Table {
        #[serde(default)]
        meta: NodeMetadata,
        columns: Vec<ColumnWidth>,
        #[serde(default)]
        header: Vec<TableRow>,
        body: Vec<TableRow>,
        #[serde(default)]
        footer: Vec<TableRow>,
        /// Repeat header and footer rows at every break inside the body.
        #[serde(default = "default_repeat")]
        repeat: bool,
    },
    /// A fixed-size replaced object.
    Image {
        #[serde(default)]
        meta: NodeMetadata,
        width: Length,
        height: Length,
    },
    PageBreak {
        #[serde(default = "default_break_class")]
        class: BreakClass,
    },
}

impl FlowNode {
    pub fn block(children: Vec<FlowNode>) -> Self {
        FlowNode::Block {
            meta: NodeMetadata::default(),
            children,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        FlowNode::Paragraph {
            meta: NodeMetadata::default(),
            style: ParagraphStyle::default(),
            inlines: vec![InlineNode::text(text)],
        }
    }

    pub fn meta(&self) -> Option<&NodeMetadata> {
        match self {
            FlowNode::Block { meta, .. }
            | FlowNode::Paragraph { meta, .. }
            | FlowNode::List { meta, .. }
            | FlowNode::Table { meta, .. }
            | FlowNode::Image { meta, .. } => Some(meta),
            FlowNode::PageBreak { .. } => None,
        }
    }

    pub fn meta_mut(&mut self) -> Option<&mut NodeMetadata> {
        match self {
            FlowNode::Block { meta, .. }
            | FlowNode::Paragraph { meta, .. }
            | FlowNode::List { meta, .. }
            | FlowNode::Table { meta, .. }
            | FlowNode::Image { meta, .. } => Some(meta),
            FlowNode::PageBreak { .. } => None,
        }
    }

    pub fn kind(&self) -> FlowKind {
        match self {
            FlowNode::Block { .. } => FlowKind::Block,
            FlowNode::Paragraph { .. } => FlowKind::Paragraph,
            FlowNode::List { .. } => FlowKind::List,
            FlowNode::Table { .. } => FlowKind::Table,
            FlowNode::Image { .. } => FlowKind::Image,
            FlowNode::PageBreak { .. } => FlowKind::PageBreak,
        }
    }
}

/// Where in a page `retrieve-marker` looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievePosition {
    #[default]
    FirstStartingWithinPage,
    FirstIncludingCarryover,
    LastStartingWithinPage,
    LastEndingWithinPage,
}

/// Content of the before/after regions, repeated on every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StaticNode {
    /// Literal text; `{page}` is replaced by the page number.
    Text { text: String },
    RetrieveMarker {
        class: String,
        #[serde(default)]
        position: RetrievePosition,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSequence {
    pub masters: SequenceMasters,
    /// Folio of the first page; continues from the previous sequence when absent.
    #[serde(default)]
    pub initial_page_number: Option<u32>,
    #[serde(default)]
    pub before: Vec<StaticNode>,
    #[serde(default)]
    pub after: Vec<StaticNode>,
    pub flow: Vec<FlowNode>,
}

impl PageSequence {
    pub fn new(master: impl Into<String>, flow: Vec<FlowNode>) -> Self {
        Self {
            masters: SequenceMasters::single(master),
            initial_page_number: None,
            before: Vec::new(),
            after: Vec::new(),
            flow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    pub masters: Vec<PageMaster>,
    pub sequences: Vec<PageSequence>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Document, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn master(&self, name: &str) -> Option<&PageMaster> {
        self.masters.iter().find(|m| m.name == name)
    }

    /// Checks the tree for content errors. Problems are reported, never fatal.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate::validate_document(self)
    }
}
