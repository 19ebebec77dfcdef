//! nom parsers for the textual forms of lengths, spaces, edges and borders.

use crate::border::{Border, BorderStyle};
use folio_types::{Color, Mpt, from_pt};
use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while_m_n};
use nom::character::complete::{char, digit1, space0, space1};
use nom::combinator::{all_consuming, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },
}

fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

/// Points per unit.
fn parse_unit(input: &str) -> IResult<&str, f32> {
    alt((
        value(1.0, tag_no_case("pt")),
        value(1.0, tag_no_case("px")),
        value(72.0, tag_no_case("in")),
        value(28.346_457, tag_no_case("cm")),
        value(2.834_645_7, tag_no_case("mm")),
    ))
    .parse(input)
}

/// Parses a length with an optional unit ("12pt", "1in", "10mm", "12") into points.
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    let (input, number) = parse_f32(input)?;
    let (input, unit) = opt(parse_unit).parse(input)?;
    Ok((input, number * unit.unwrap_or(1.0)))
}

fn lengths(input: &str) -> Result<Vec<Mpt>, StyleParseError> {
    all_consuming(delimited(space0, separated_list1(space1, parse_length), space0))
        .parse(input)
        .map(|(_, values)| values.into_iter().map(from_pt).collect())
        .map_err(|e| StyleParseError::Parse(format!("'{}': {}", input, e)))
}

/// A single length, in millipoints.
pub fn length_mpt(input: &str) -> Result<Mpt, StyleParseError> {
    match lengths(input)?.as_slice() {
        [single] => Ok(*single),
        _ => Err(StyleParseError::InvalidValue {
            property: "length".into(),
            value: input.into(),
        }),
    }
}

/// Shorthand of 1, 2 or 4 lengths, expanded to `[before, end, after, start]`.
pub fn parse_edges(input: &str) -> Result<[Mpt; 4], StyleParseError> {
    match lengths(input)?.as_slice() {
        [all] => Ok([*all; 4]),
        [vertical, horizontal] => Ok([*vertical, *horizontal, *vertical, *horizontal]),
        [before, end, after, start] => Ok([*before, *end, *after, *start]),
        other => Err(StyleParseError::Parse(format!(
            "expected 1, 2 or 4 values for an edge shorthand, got {}",
            other.len()
        ))),
    }
}

/// A space specifier: either an optimum ("6pt") or "minimum optimum maximum".
pub fn parse_space_range(input: &str) -> Result<(Mpt, Mpt, Mpt), StyleParseError> {
    match lengths(input)?.as_slice() {
        [optimum] => Ok((*optimum, *optimum, *optimum)),
        [minimum, optimum, maximum] if minimum <= optimum && optimum <= maximum => {
            Ok((*minimum, *optimum, *maximum))
        }
        _ => Err(StyleParseError::InvalidValue {
            property: "space".into(),
            value: input.into(),
        }),
    }
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    map_res(
        recognize(preceded(
            char('#'),
            take_while_m_n(3, 6, |c: char| c.is_ascii_hexdigit()),
        )),
        Color::parse_hex,
    )
    .parse(input)
}

fn border_style(input: &str) -> IResult<&str, BorderStyle> {
    alt((
        value(BorderStyle::Solid, tag_no_case("solid")),
        value(BorderStyle::Dashed, tag_no_case("dashed")),
        value(BorderStyle::Dotted, tag_no_case("dotted")),
        value(BorderStyle::None, tag_no_case("none")),
    ))
    .parse(input)
}

/// Border shorthand: "1pt solid #000", color optional.
pub fn parse_border(input: &str) -> Result<Border, StyleParseError> {
    all_consuming(delimited(
        space0,
        (
            parse_length,
            preceded(space1, border_style),
            opt(preceded(space1, hex_color)),
        ),
        space0,
    ))
    .parse(input)
    .map(|(_, (width, style, color))| Border {
        width: from_pt(width).into(),
        style,
        color: color.unwrap_or(Color::BLACK),
    })
    .map_err(|e| StyleParseError::Parse(format!("border '{}': {}", input, e)))
}
