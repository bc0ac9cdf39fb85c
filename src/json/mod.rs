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

//! Traversal primitives over JSON values.
//!
//! The document model is [`serde_json::Value`]. This module adds the read-only
//! primitives the evaluator is built from:
//!
//! - [`JsonExt::get_key`]: member access, broadcast over arrays.
//! - [`JsonExt::get_idx`]: single array element, negative indices count from the end.
//! - [`JsonExt::get_range`]: inclusive array slice.
//! - [`JsonExt::get_scan`]: the children of an array or object.
//!
//! Object members are visited in the iteration order of [`Map`](::serde_json::Map).

use std::borrow::Cow;

use ::serde_json::Value;

use crate::eval::Result;

mod serde_json;

/// Extension methods for traversing a JSON value.
///
/// None of the methods mutate `self`. Results that are sub-values of `self` are
/// borrowed, results that had to be assembled (broadcasts, slices, scans) are
/// returned as new arrays.
pub trait JsonExt {
    /// Returns the member `key` of an object.
    ///
    /// If `self` is an array, the lookup is broadcast to every element and the
    /// successful results are collected into a new array, in element order.
    /// Elements that fail are silently left out.
    ///
    /// Fails with [`EvalError::NullAccess`] on `null`, with
    /// [`EvalError::NoKey`] if an object lacks the key, and with
    /// [`EvalError::MemberAccess`] on any other scalar.
    ///
    /// [`EvalError::NullAccess`]: crate::EvalError::NullAccess
    /// [`EvalError::NoKey`]: crate::EvalError::NoKey
    /// [`EvalError::MemberAccess`]: crate::EvalError::MemberAccess
    fn get_key(&self, key: &str) -> Result<Cow<'_, Value>>;

    /// Returns the element at `index` of an array. A negative index counts from
    /// the end, so `-1` is the last element.
    fn get_idx(&self, index: i64) -> Result<&Value>;

    /// Returns the elements of an array between `from` and `to`, both inclusive.
    ///
    /// An absent `from` starts at the first element, an absent `to` ends at the
    /// last one. Negative bounds count from the end. The start must name an
    /// element, so any slice of an empty array is out of bounds.
    fn get_range(&self, from: Option<i64>, to: Option<i64>) -> Result<Value>;

    /// Returns the children of an array or the member values of an object as a
    /// new array.
    fn get_scan(&self) -> Result<Value>;

    /// Returns the text form used when comparing values in filters.
    ///
    /// Strings render as their raw content, everything else as JSON text.
    fn render(&self) -> Cow<'_, str>;

    /// Returns the name of the value's kind, e.g. `"array"`.
    fn kind(&self) -> &'static str;
}
