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

use std::borrow::Cow;

use serde_json::Value;

use crate::ast::*;
use crate::json::JsonExt;
use crate::parser::Error as ParseError;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned when looking up a path.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error("jsonpath member accessor cannot be applied to null")]
    NullAccess,
    #[error("JSON object does not contain key \"{0}\"")]
    NoKey(Box<str>),
    #[error("jsonpath member accessor can only be applied to an object or array")]
    MemberAccess,
    #[error("jsonpath array accessor can only be applied to an array")]
    ArrayAccess,
    #[error("jsonpath wildcard can only be applied to an object or array, not {0}")]
    NotScannable(&'static str),
    #[error("jsonpath array subscript {index} is out of bounds for array of length {len}")]
    IndexOutOfBounds { len: usize, index: i64 },
    #[error("jsonpath slice start {from} is out of bounds for array of length {len}")]
    SliceStartOutOfBounds { len: usize, from: i64 },
    #[error("jsonpath slice end {to} is out of bounds for array of length {len}")]
    SliceEndOutOfBounds { len: usize, to: i64 },
    #[error("jsonpath array subscript list is empty")]
    EmptyIndexList,
    #[error("jsonpath filter can only be applied to an object or array, not {0}")]
    FilterTarget(&'static str),
    #[error("jsonpath filter operator {0} is not implemented")]
    NotImplemented(&'static str),
}

/// Compiles `path` and looks it up in `value`.
///
/// Use [`JsonPath::new`] and [`JsonPath::lookup`] to look up the same path in
/// many documents.
pub fn lookup(value: &Value, path: &str) -> Result<Value> {
    JsonPath::new(path)?.lookup(value)
}

impl JsonPath {
    /// Looks up the path in `value`.
    ///
    /// `value` is never modified. The result is a new value that shares nothing
    /// with the document.
    pub fn lookup(&self, value: &Value) -> Result<Value> {
        Evaluator { root: value }
            .eval(Cow::Borrowed(value), &self.segments)
            .map(Cow::into_owned)
    }
}

/// Evaluation context.
struct Evaluator<'a> {
    /// The document, for `$.` operands in filters.
    root: &'a Value,
}

impl<'a> Evaluator<'a> {
    /// Applies `segments` one after another, starting from `start`.
    fn eval<'v>(&self, start: Cow<'v, Value>, segments: &[Segment]) -> Result<Cow<'v, Value>>
    where
        'a: 'v,
    {
        segments.iter().try_fold(start, |current, segment| {
            tracing::trace!(target: "jsonpath_lookup::eval", ?segment, "step");
            self.eval_segment(current, segment)
        })
    }

    fn eval_segment<'v>(&self, current: Cow<'v, Value>, segment: &Segment) -> Result<Cow<'v, Value>>
    where
        'a: 'v,
    {
        match segment {
            Segment::Root | Segment::Scan => Ok(current),
            Segment::Key(key) => map_cow(current, |v| v.get_key(key)),
            Segment::Index { key, indices } => {
                let current = member(current, key)?;
                match indices.as_slice() {
                    [] => Err(Error::EmptyIndexList),
                    [index] => map_cow(current, |v| v.get_idx(*index).map(Cow::Borrowed)),
                    indices => map_cow(current, |v| {
                        let values = indices
                            .iter()
                            .map(|index| v.get_idx(*index).cloned())
                            .collect::<Result<Vec<_>>>()?;
                        Ok(Cow::Owned(Value::Array(values)))
                    }),
                }
            }
            Segment::Range { key, from, to } => {
                let current = member(current, key)?;
                map_cow(current, |v| v.get_range(*from, *to).map(Cow::Owned))
            }
            Segment::Filter { key, predicate } => {
                let current = member(current, key)?;
                map_cow(current, |v| self.filter(v, predicate).map(Cow::Owned))
            }
        }
    }

    /// Returns the elements of an array, or the member values of an object,
    /// that satisfy `predicate`.
    fn filter(&self, value: &Value, predicate: &Predicate) -> Result<Value> {
        let candidates: Vec<&Value> = match value {
            Value::Array(array) => array.iter().collect(),
            Value::Object(object) => object.values().collect(),
            other => return Err(Error::FilterTarget(other.kind())),
        };
        let mut matched = vec![];
        for candidate in candidates {
            if self.eval_predicate(candidate, predicate)? {
                matched.push(candidate.clone());
            }
        }
        Ok(Value::Array(matched))
    }

    fn eval_predicate(&self, current: &Value, predicate: &Predicate) -> Result<bool> {
        let left = self.resolve(current, &predicate.left);
        match predicate.op {
            FilterOp::Exists => Ok(left.is_some()),
            FilterOp::Match => Err(Error::NotImplemented("=~")),
            FilterOp::Compare(op) => {
                let right = predicate
                    .right
                    .as_ref()
                    .and_then(|right| self.resolve(current, right));
                match (left, right) {
                    (Some(left), Some(right)) => Ok(compare(op, &left, &right)),
                    _ => Ok(false),
                }
            }
        }
    }

    /// Resolves an operand to its text form.
    ///
    /// Returns `None` if its path does not resolve or resolves to `null`.
    fn resolve<'v>(&self, current: &'v Value, operand: &'v Operand) -> Option<Cow<'v, str>>
    where
        'a: 'v,
    {
        let (start, segments) = match operand {
            Operand::Literal(s) => return Some(Cow::Borrowed(s.as_str())),
            Operand::Current(segments) => (current, segments),
            Operand::Root(segments) => (self.root, segments),
        };
        match self.eval(Cow::Borrowed(start), segments) {
            Ok(value) if value.is_null() => None,
            Ok(Cow::Borrowed(value)) => Some(value.render()),
            Ok(Cow::Owned(value)) => Some(Cow::Owned(value.render().into_owned())),
            Err(err) => {
                tracing::debug!(
                    target: "jsonpath_lookup::eval",
                    %operand,
                    %err,
                    "filter operand is absent"
                );
                None
            }
        }
    }
}

/// Looks up `key` first, unless it is empty.
fn member<'v>(current: Cow<'v, Value>, key: &str) -> Result<Cow<'v, Value>> {
    if key.is_empty() {
        Ok(current)
    } else {
        map_cow(current, |v| v.get_key(key))
    }
}

/// Applies `f` to the value in `cow`.
///
/// Borrows of a borrowed value are passed through, anything derived from an
/// owned value is made owned.
fn map_cow<'v>(
    cow: Cow<'v, Value>,
    f: impl for<'b> FnOnce(&'b Value) -> Result<Cow<'b, Value>>,
) -> Result<Cow<'v, Value>> {
    match cow {
        Cow::Borrowed(v) => f(v),
        Cow::Owned(v) => f(&v).map(|r| Cow::Owned(r.into_owned())),
    }
}

/// Compares the text forms of two operands.
///
/// If both look like unsigned decimal numbers they are compared as numbers,
/// otherwise as strings.
fn compare(op: CompareOp, left: &str, right: &str) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(left), Some(right)) => compare_ord(op, left, right),
        _ => compare_ord(op, left, right),
    }
}

/// Digits with at most one `.`. Signs and exponents are not numbers here.
fn as_number(s: &str) -> Option<f64> {
    let mut digits = 0;
    let mut dots = 0;
    for c in s.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    s.parse().ok()
}

fn compare_ord<T: PartialOrd>(op: CompareOp, left: T, right: T) -> bool {
    use CompareOp::*;
    match op {
        Eq => left == right,
        Gt => left > right,
        Ge => left >= right,
        Lt => left < right,
        Le => left <= right,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn compare_values() {
        use CompareOp::*;
        assert!(compare(Eq, "1", "1"));
        assert!(!compare(Eq, "1", "2"));
        assert!(compare(Lt, "1.1", "2.0"));
        assert!(compare(Lt, "1", "2.0"));
        assert!(!compare(Gt, "1", "2.0"));
        assert!(compare(Eq, "haha", "haha"));
        assert!(compare(Eq, "ha ha", "ha ha"));
        assert!(compare(Eq, "1.0", "1"));
        assert!(compare(Ge, "8.95", "8.95"));
        // numeric, not lexicographic
        assert!(!compare(Gt, "20", "100"));
        assert!(compare(Lt, "9", "10"));
        // anything that is not a plain decimal compares as text
        assert!(compare(Gt, "9", "-10"));
        assert!(compare(Lt, "1e3", "2"));
        assert!(compare(Lt, "abc", "abd"));
        assert!(!compare(Eq, "1.2.3", "1.2"));
    }

    #[test]
    fn numbers() {
        assert_eq!(as_number("10"), Some(10.0));
        assert_eq!(as_number("8.95"), Some(8.95));
        assert_eq!(as_number(".5"), Some(0.5));
        assert_eq!(as_number("1."), Some(1.0));
        assert_eq!(as_number("."), None);
        assert_eq!(as_number(""), None);
        assert_eq!(as_number("-1"), None);
        assert_eq!(as_number("1.2.3"), None);
        assert_eq!(as_number("1e3"), None);
    }

    #[test]
    fn filter_semantics() {
        let doc = json!({"items": [{"a": 1}, {"a": null}, {"b": 2}], "n": 5});

        // a null member does not exist
        assert_eq!(lookup(&doc, "$.items[?(@.a)]"), Ok(json!([{"a": 1}])));
        assert_eq!(lookup(&doc, "$.items[?(@.a == null)]"), Ok(json!([])));
        // comparing with an absent operand is false
        assert_eq!(lookup(&doc, "$.items[?(@.b < 10)]"), Ok(json!([{"b": 2}])));
        assert_eq!(lookup(&doc, "$.items[?(@.a < $.missing)]"), Ok(json!([])));
        // objects are filtered over their member values
        assert_eq!(
            lookup(&json!({"x": {"v": 1}, "y": {"v": 7}}), "$[?(@.v > 5)]"),
            Ok(json!([{"v": 7}]))
        );
        assert_eq!(
            lookup(&doc, "$.n[?(@.a)]"),
            Err(Error::FilterTarget("number"))
        );
        assert_eq!(
            lookup(&doc, "$.items[?(@.a =~ /1/)]"),
            Err(Error::NotImplemented("=~"))
        );
    }

    #[test]
    #[cfg(not(feature = "preserve_order"))]
    fn filter_object_sorted_by_key() {
        let doc = json!({"y": {"v": 7}, "z": {"v": 1}, "x": {"v": 6}});
        assert_eq!(
            lookup(&doc, "$[?(@.v > 5)]"),
            Ok(json!([{"v": 6}, {"v": 7}]))
        );
    }

    #[test]
    #[cfg(feature = "preserve_order")]
    fn filter_object_document_order() {
        let doc = json!({"y": {"v": 7}, "z": {"v": 1}, "x": {"v": 6}});
        assert_eq!(
            lookup(&doc, "$[?(@.v > 5)]"),
            Ok(json!([{"v": 7}, {"v": 6}]))
        );
    }

    #[test]
    fn owned_intermediate() {
        // the broadcast result is owned, later steps must still work on it
        let doc = json!({"rows": [{"v": [1, 2]}, {"v": [3, 4]}]});
        assert_eq!(lookup(&doc, "$.rows.v[1]"), Ok(json!([3, 4])));
        assert_eq!(lookup(&doc, "$.rows.v[0:0]"), Ok(json!([[1, 2]])));
        assert_eq!(lookup(&doc, "$.rows.v[0,1]"), Ok(json!([[1, 2], [3, 4]])));
    }

    #[test]
    fn empty_index_list() {
        let path = JsonPath {
            segments: vec![
                Segment::Root,
                Segment::Index {
                    key: String::new(),
                    indices: vec![],
                },
            ],
        };
        assert_eq!(path.lookup(&json!([1])), Err(Error::EmptyIndexList));
    }

    #[test]
    fn document_unchanged() {
        let doc = json!({"a": [{"b": 1}, {"b": 2}]});
        let before = doc.clone();
        let mut result = lookup(&doc, "$.a[0:]").unwrap();
        result[0]["b"] = json!(100);
        assert_eq!(doc, before);
    }
}
