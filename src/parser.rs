// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lookup path parser.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i64, multispace0 as s},
    combinator::{all_consuming, map, value},
    multi::separated_list1,
    sequence::delimited,
    Finish, IResult, Offset,
};

use crate::ast::*;
use crate::tokenizer::{tokenize, Token};

impl JsonPath {
    /// Compiles a lookup path.
    pub fn new(path: &str) -> Result<Self, Error> {
        let tokens = tokenize(path)?;
        let mut segments = Vec::with_capacity(tokens.len());
        segments.push(Segment::Root);
        for token in &tokens[1..] {
            let segment = segment(token)?;
            if segment == Segment::Root {
                return Err(Error::new(
                    token.position,
                    "root marker can only appear at the start of a path",
                ));
            }
            segments.push(segment);
        }
        Ok(JsonPath { segments })
    }
}

impl FromStr for JsonPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A syntax error in a lookup path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at position {position}, {message}")]
pub struct Error {
    position: usize,
    message: Box<str>,
}

impl Error {
    pub(crate) fn new(position: usize, message: impl Into<Box<str>>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// Byte offset in the path where the error was detected.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Shifts the position of an error found in a part of the path that starts at `offset`.
    fn offset(mut self, offset: usize) -> Self {
        self.position += offset;
        self
    }
}

/// Parses a token after the root into a segment.
fn segment(token: &Token) -> Result<Segment, Error> {
    let text = token.text.as_str();
    match text {
        "$" => return Ok(Segment::Root),
        "*" => return Ok(Segment::Scan),
        _ => {}
    }
    let Some(open) = text.find('[') else {
        return Ok(Segment::Key(text.to_owned()));
    };
    let key = text[..open].to_owned();
    let Some(tail) = text[open + 1..].strip_suffix(']') else {
        return Err(Error::new(token.position + open, "unmatched bracket"));
    };
    let position = token.position + open + 1;
    if tail.is_empty() {
        return Err(Error::new(position, "empty brackets"));
    }

    if tail.contains('?') {
        let Some(inner) = tail.strip_prefix("?(").and_then(|t| t.strip_suffix(')')) else {
            return Err(Error::new(position, "filter should be of the form [?(...)]"));
        };
        let predicate = inner.trim_start_matches(' ');
        let position = position + 2 + (inner.len() - predicate.len());
        let predicate = Predicate::parse(predicate.trim_end_matches(' '))
            .map_err(|e| e.offset(position))?;
        Ok(Segment::Filter { key, predicate })
    } else if tail.contains(':') {
        let Some((from, to)) = tail.split_once(':').filter(|(_, to)| !to.contains(':')) else {
            return Err(Error::new(position, "only one ':' is allowed in a range"));
        };
        Ok(Segment::Range {
            key,
            from: bound(from),
            to: bound(to),
        })
    } else if tail == "*" {
        Ok(Segment::Range {
            key,
            from: None,
            to: None,
        })
    } else {
        let (_, indices) = all_consuming(index_list)(tail)
            .finish()
            .map_err(|e| Error::new(position + tail.offset(e.input), "invalid array index"))?;
        Ok(Segment::Index { key, indices })
    }
}

fn index_list(input: &str) -> IResult<&str, Vec<i64>> {
    separated_list1(char(','), delimited(s, i64, s))(input)
}

/// A blank or malformed range bound is treated as absent.
fn bound(input: &str) -> Option<i64> {
    let result: IResult<&str, i64> = all_consuming(delimited(s, i64, s))(input);
    result.ok().map(|(_, v)| v)
}

/// A field of a predicate and where it starts.
#[derive(Debug, Default)]
struct Field {
    text: String,
    position: usize,
    quoted: bool,
}

impl Predicate {
    /// Parses `<left>`, `<left> exists` or `<left> <op> <right>`.
    ///
    /// Fields are separated by single spaces. A field wrapped in `'` may contain
    /// spaces and is always a literal.
    pub(crate) fn parse(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Err(Error::new(0, "empty filter"));
        }
        let [left, op, right] = fields(text)?;
        let left = operand(left.unwrap_or_default())?;
        let op = match op {
            None => FilterOp::Exists,
            Some(field) => all_consuming(filter_op)(field.text.as_str())
                .finish()
                .map(|(_, op)| op)
                .map_err(|_| {
                    Error::new(
                        field.position,
                        format!(
                            "unsupported operator \"{}\", op should only be <, <=, ==, >= and >",
                            field.text
                        ),
                    )
                })?,
        };
        let right = match op {
            FilterOp::Exists => None,
            _ => Some(operand(right.unwrap_or(Field {
                position: text.len(),
                ..Default::default()
            }))?),
        };
        Ok(Predicate { left, op, right })
    }
}

/// Splits a predicate into up to three fields.
fn fields(text: &str) -> Result<[Option<Field>; 3], Error> {
    let mut fields: [Option<Field>; 3] = Default::default();
    let mut slot = 0;
    let mut current = String::new();
    let mut start = None;
    let mut quote = None;
    // the space right after a closing quote is its delimiter
    let mut closed = false;

    let mut commit = |slot: usize, field: Field| match fields.get_mut(slot) {
        Some(f) => {
            *f = Some(field);
            Ok(())
        }
        None => Err(Error::new(
            field.position,
            "too many fields in filter, expected <left> <op> <right>",
        )),
    };

    for (i, c) in text.char_indices() {
        match c {
            '\'' => match quote.take() {
                None => {
                    quote = Some(i);
                    start.get_or_insert(i);
                }
                Some(_) => {
                    let field = Field {
                        text: std::mem::take(&mut current),
                        position: start.take().unwrap_or(i),
                        quoted: true,
                    };
                    commit(slot, field)?;
                    slot += 1;
                    closed = true;
                }
            },
            ' ' if quote.is_some() => current.push(c),
            ' ' if closed => closed = false,
            ' ' => {
                let field = Field {
                    text: std::mem::take(&mut current),
                    position: start.take().unwrap_or(i),
                    quoted: false,
                };
                commit(slot, field)?;
                slot += 1;
                if slot > 2 {
                    return Err(Error::new(
                        i,
                        "too many fields in filter, expected <left> <op> <right>",
                    ));
                }
            }
            _ => {
                start.get_or_insert(i);
                current.push(c);
                closed = false;
            }
        }
    }
    if let Some(quote) = quote {
        return Err(Error::new(quote, "unterminated quote in filter"));
    }
    if !current.is_empty() {
        let field = Field {
            text: current,
            position: start.unwrap_or(0),
            quoted: false,
        };
        commit(slot, field)?;
    }
    Ok(fields)
}

fn filter_op(input: &str) -> IResult<&str, FilterOp> {
    alt((
        value(FilterOp::Exists, tag("exists")),
        value(FilterOp::Match, tag("=~")),
        map(cmp_op, FilterOp::Compare),
    ))(input)
}

fn cmp_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Lt, char('<')),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Gt, char('>')),
    ))(input)
}

fn operand(field: Field) -> Result<Operand, Error> {
    if field.quoted {
        Ok(Operand::Literal(field.text))
    } else if field.text.starts_with("@.") {
        Ok(Operand::Current(operand_path(&field)?))
    } else if field.text.starts_with("$.") {
        Ok(Operand::Root(operand_path(&field)?))
    } else {
        Ok(Operand::Literal(field.text))
    }
}

/// Parses the path of an operand. Only member names and single indices are allowed.
fn operand_path(field: &Field) -> Result<Vec<Segment>, Error> {
    let tokens = tokenize(&field.text).map_err(|e| e.offset(field.position))?;
    tokens[1..]
        .iter()
        .map(|token| {
            let segment = segment(token).map_err(|e| e.offset(field.position))?;
            match &segment {
                Segment::Key(_) => Ok(segment),
                Segment::Index { indices, .. } if indices.len() == 1 => Ok(segment),
                _ => Err(Error::new(
                    field.position + token.position,
                    "expression not supported in filter",
                )),
            }
        })
        .collect()
}
