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

//! A small JSONPath-like lookup language over [`serde_json::Value`].
//!
//! # Usage
//!
//! ```rust
//! use serde_json::json;
//! use jsonpath_lookup::{lookup, JsonPath};
//!
//! let doc = json!({
//!     "store": {
//!         "book": [
//!             {"title": "Sayings of the Century", "price": 8.95},
//!             {"title": "Sword of Honour", "price": 12.99}
//!         ]
//!     },
//!     "expensive": 10
//! });
//!
//! assert_eq!(lookup(&doc, "$.store.book[0].price").unwrap(), json!(8.95));
//!
//! let path = JsonPath::new("$.store.book[?(@.price > $.expensive)].title").unwrap();
//! assert_eq!(path.lookup(&doc).unwrap(), json!(["Sword of Honour"]));
//! ```
//!
//! # Syntax
//!
//! | Path                     | Selects                                              |
//! |--------------------------|------------------------------------------------------|
//! | `$` or `@`               | the document                                         |
//! | `.name`, `."a name"`     | a member of an object, or of every element of an array |
//! | `*`, `..`                | the current value, unchanged                         |
//! | `[i]`, `[i,j]`           | elements by position, negative from the end          |
//! | `[from:to]`, `[*]`       | elements between two positions, both inclusive       |
//! | `[?(@.a > 1)]`           | elements that satisfy a predicate                    |
//!
//! Looking up a path never modifies the document.

mod ast;
mod eval;
mod json;
mod parser;
mod tokenizer;

pub use ast::{CompareOp, FilterOp, JsonPath, Operand, Predicate, Segment};
pub use eval::{lookup, Error as EvalError};
pub use json::JsonExt;
pub use parser::Error as ParseError;
