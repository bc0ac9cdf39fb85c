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

//! The AST of a lookup path.

use std::fmt::Display;
use std::fmt::Formatter;

/// A compiled lookup path.
///
/// Parsing happens once in [`JsonPath::new`]; the compiled path can then be
/// looked up in any number of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    /// Always starts with [`Segment::Root`].
    pub(crate) segments: Vec<Segment>,
}

impl JsonPath {
    /// Returns the segments of the path, starting with [`Segment::Root`].
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `$` or `@` anchors the path at the document.
    Root,
    /// `.<name>` selects the member `name` of an object, like `$.store`.
    /// Applied to an array, it selects the member from every element that has it.
    /// The name can be quoted to contain dots or spaces, like `$."first name"`.
    Key(String),
    /// `*`, or the `..` recursive descent.
    ///
    /// The current value is passed on unchanged; member lookups that follow it
    /// reach into nested arrays through broadcasting.
    Scan,
    /// `<key>[<index1>,<index2>,..]` selects elements of an array by position.
    /// Negative positions count from the end, so `[-1]` is the last element.
    ///
    /// A single position yields the element itself, several positions yield an
    /// array in the order they are written.
    Index {
        /// Member looked up first, empty to index the current value.
        key: String,
        indices: Vec<i64>,
    },
    /// `<key>[<from>:<to>]` selects the elements between two positions, both inclusive.
    /// Either bound can be omitted. `[*]` selects every element.
    Range {
        /// Member looked up first, empty to slice the current value.
        key: String,
        from: Option<i64>,
        to: Option<i64>,
    },
    /// `<key>[?(<predicate>)]` selects the elements of an array, or the member
    /// values of an object, that satisfy the predicate.
    Filter {
        /// Member looked up first, empty to filter the current value.
        key: String,
        predicate: Predicate,
    },
}

/// A filter predicate: `<left>`, or `<left> <op> <right>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub(crate) left: Operand,
    pub(crate) op: FilterOp,
    /// `None` for [`FilterOp::Exists`].
    pub(crate) right: Option<Operand>,
}

impl Predicate {
    /// Returns the left operand.
    pub fn left(&self) -> &Operand {
        &self.left
    }

    /// Returns the operator.
    pub fn op(&self) -> FilterOp {
        self.op
    }

    /// Returns the right operand, if the operator takes one.
    pub fn right(&self) -> Option<&Operand> {
        self.right.as_ref()
    }
}

/// An operand of a filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `@.<path>` is resolved against the element being filtered.
    Current(Vec<Segment>),
    /// `$.<path>` is resolved against the document root.
    Root(Vec<Segment>),
    /// Any other text, or any `'quoted text'`, is a string constant.
    Literal(String),
}

/// A filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// A predicate without operator tests whether the left operand exists.
    Exists,
    /// `=~` matches the left operand against a regular expression. Not implemented.
    Match,
    /// A comparison.
    Compare(CompareOp),
}

/// A comparison operator.
///
/// Operands that both look like unsigned decimal numbers are compared as numbers,
/// anything else is compared as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `>=`
    Ge,
    /// `>`
    Gt,
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        fmt_steps(f, &self.segments)
    }
}

/// Writes every segment but [`Segment::Root`] as a path step.
fn fmt_steps(f: &mut Formatter<'_>, segments: &[Segment]) -> std::fmt::Result {
    let mut prev: Option<&Segment> = None;
    for segment in segments {
        match segment {
            Segment::Root => {}
            Segment::Key(key) => write!(f, ".{}", Name(key))?,
            Segment::Scan => write!(f, ".*")?,
            Segment::Index { key, .. } | Segment::Range { key, .. } | Segment::Filter { key, .. } => {
                if !key.is_empty() {
                    write!(f, ".{}", Name(key))?;
                } else if matches!(prev, Some(Segment::Key(_) | Segment::Scan)) {
                    // a bracket right after a name would be read as part of that name
                    write!(f, ".")?;
                }
                write!(f, "{segment}")?;
            }
        }
        prev = Some(segment);
    }
    Ok(())
}

/// A member name, quoted when it would not survive tokenizing as is.
struct Name<'a>(&'a str);

impl Display for Name<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() || self.0.contains(['.', ' ']) {
            write!(f, "\"{}\"", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Writes a segment without its separator or key.
impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "$"),
            Self::Key(key) => write!(f, "{key}"),
            Self::Scan => write!(f, "*"),
            Self::Index { indices, .. } => {
                write!(f, "[")?;
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{index}")?;
                }
                write!(f, "]")
            }
            Self::Range {
                from: None,
                to: None,
                ..
            } => write!(f, "[*]"),
            Self::Range { from, to, .. } => {
                write!(f, "[")?;
                if let Some(from) = from {
                    write!(f, "{from}")?;
                }
                write!(f, ":")?;
                if let Some(to) = to {
                    write!(f, "{to}")?;
                }
                write!(f, "]")
            }
            Self::Filter { predicate, .. } => write!(f, "[?({predicate})]"),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.left)?;
        match (self.op, &self.right) {
            (FilterOp::Exists, _) => Ok(()),
            (op, Some(right)) => write!(f, " {op} {right}"),
            (op, None) => write!(f, " {op}"),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current(segments) => {
                write!(f, "@")?;
                fmt_steps(f, segments)
            }
            Self::Root(segments) => {
                write!(f, "$")?;
                fmt_steps(f, segments)
            }
            Self::Literal(s) => {
                if s.is_empty() || s.contains(' ') || s.starts_with("@.") || s.starts_with("$.") {
                    write!(f, "'{s}'")
                } else {
                    write!(f, "{s}")
                }
            }
        }
    }
}

impl Display for FilterOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exists => write!(f, "exists"),
            Self::Match => write!(f, "=~"),
            Self::Compare(op) => write!(f, "{op}"),
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Eq => write!(f, "=="),
            Self::Ge => write!(f, ">="),
            Self::Gt => write!(f, ">"),
        }
    }
}
