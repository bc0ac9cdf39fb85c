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

use super::*;
use crate::eval::Error;

impl JsonExt for Value {
    fn get_key(&self, key: &str) -> Result<Cow<'_, Value>> {
        match self {
            Value::Object(object) => object
                .get(key)
                .map(Cow::Borrowed)
                .ok_or_else(|| Error::NoKey(key.into())),
            Value::Array(array) => {
                let values = array
                    .iter()
                    .filter_map(|elem| match elem.get_key(key) {
                        Ok(v) => Some(v.into_owned()),
                        Err(err) => {
                            tracing::debug!(
                                target: "jsonpath_lookup::json",
                                key,
                                %err,
                                "dropping element from member broadcast"
                            );
                            None
                        }
                    })
                    .collect();
                Ok(Cow::Owned(Value::Array(values)))
            }
            Value::Null => Err(Error::NullAccess),
            _ => Err(Error::MemberAccess),
        }
    }

    fn get_idx(&self, index: i64) -> Result<&Value> {
        let array = self.as_array().ok_or(Error::ArrayAccess)?;
        let len = array.len();
        let resolved = if index < 0 {
            (len as i64).checked_add(index)
        } else {
            Some(index)
        };
        resolved
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| array.get(i))
            .ok_or(Error::IndexOutOfBounds { len, index })
    }

    fn get_range(&self, from: Option<i64>, to: Option<i64>) -> Result<Value> {
        let array = self.as_array().ok_or(Error::ArrayAccess)?;
        let len = array.len() as i64;
        let start = match from {
            None => 0,
            Some(from) if from < 0 => len.saturating_add(from),
            Some(from) => from,
        };
        // `to` is inclusive, `end` is not
        let end = match to {
            None => len,
            Some(to) if to < 0 => len.saturating_add(to).saturating_add(1),
            Some(to) => to.saturating_add(1),
        };
        if start < 0 || start >= len {
            return Err(Error::SliceStartOutOfBounds {
                len: array.len(),
                from: from.unwrap_or(0),
            });
        }
        if end < 0 || end > len {
            return Err(Error::SliceEndOutOfBounds {
                len: array.len(),
                to: to.unwrap_or(len),
            });
        }
        if end <= start {
            return Ok(Value::Array(vec![]));
        }
        Ok(Value::Array(array[start as usize..end as usize].to_vec()))
    }

    fn get_scan(&self) -> Result<Value> {
        match self {
            Value::Object(object) => Ok(Value::Array(object.values().cloned().collect())),
            Value::Array(array) => Ok(Value::Array(array.clone())),
            other => Err(Error::NotScannable(other.kind())),
        }
    }

    fn render(&self) -> Cow<'_, str> {
        match self {
            Value::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
