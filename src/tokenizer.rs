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

//! Splits a path string into segment tokens.
//!
//! ```text
//! $.store.book[0].price   =>  $  store  book[0]  price
//! $..author               =>  $  *  author
//! $."a.b"[?(@.c > 1)]     =>  $  a.b[?(@.c > 1)]
//! ```

use crate::parser::Error;

/// A segment token and the byte position where it starts in the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub text: String,
    pub position: usize,
}

/// The scanning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between or inside member names, `.` separates tokens.
    Normal,
    /// Inside `[...]`, everything is copied verbatim until the bracket at `depth` 1 closes.
    InBracket { depth: usize },
    /// Inside `"..."`, opened at `start`.
    InQuote { start: usize },
}

struct Tokenizer {
    tokens: Vec<Token>,
    /// Accumulated text of the current token, possibly with a leading `.`.
    text: String,
    /// Position of the first character of `text`.
    position: usize,
    /// Whether `text` contains a quoted name. An empty quoted name is still a token.
    quoted: bool,
    /// Content of the open quote.
    quote: String,
    state: State,
}

/// Tokenizes a path.
///
/// The first token is always the root marker `$` or `@`. A `..` becomes a `*`
/// token and consecutive `*` tokens collapse into one.
pub(crate) fn tokenize(path: &str) -> Result<Vec<Token>, Error> {
    let mut chars = path.char_indices();
    match chars.next() {
        Some((_, c @ ('$' | '@'))) => {
            let mut tokenizer = Tokenizer {
                tokens: vec![Token {
                    text: c.to_string(),
                    position: 0,
                }],
                text: String::new(),
                position: 1,
                quoted: false,
                quote: String::new(),
                state: State::Normal,
            };
            for (i, c) in chars {
                tokenizer.next_char(i, c);
            }
            tokenizer.finish()
        }
        _ => Err(Error::new(0, "path should start with '$' or '@'")),
    }
}

impl Tokenizer {
    fn next_char(&mut self, i: usize, c: char) {
        match self.state {
            State::Normal => self.normal(i, c),
            State::InBracket { depth } => self.in_bracket(depth, c),
            State::InQuote { .. } if c == '"' => {
                self.text.push_str(&self.quote);
                self.quote.clear();
                self.quoted = true;
                self.state = State::Normal;
            }
            State::InQuote { .. } => self.quote.push(c),
        }
    }

    fn normal(&mut self, i: usize, c: char) {
        if self.text.is_empty() && !self.quoted {
            self.position = i;
        }
        if c == '"' {
            self.state = State::InQuote { start: i };
            return;
        }
        self.text.push(c);
        if self.text == "." && !self.quoted {
            return;
        }
        if self.text == ".." && !self.quoted {
            self.push_token(String::from("*"), i);
            self.restart(i);
            return;
        }
        match c {
            '[' => self.state = State::InBracket { depth: 1 },
            '.' => {
                self.text.pop();
                self.emit();
                self.restart(i);
            }
            _ => {}
        }
    }

    fn in_bracket(&mut self, depth: usize, c: char) {
        let escaped = self.text.ends_with('\\');
        self.text.push(c);
        match c {
            '[' if !escaped => self.state = State::InBracket { depth: depth + 1 },
            ']' if !escaped && depth == 1 => {
                self.emit();
                self.text.clear();
                self.state = State::Normal;
            }
            ']' if !escaped => self.state = State::InBracket { depth: depth - 1 },
            _ => {}
        }
    }

    /// Starts a new token with the separator `.` at `i`.
    fn restart(&mut self, i: usize) {
        self.text.clear();
        self.text.push('.');
        self.position = i;
        self.quoted = false;
    }

    /// Emits the current token, without its leading `.`.
    fn emit(&mut self) {
        let (text, position) = match self.text.strip_prefix('.') {
            Some(text) => (text.to_owned(), self.position + 1),
            None => (self.text.clone(), self.position),
        };
        if !text.is_empty() || self.quoted {
            self.push_token(text, position);
        }
        self.quoted = false;
    }

    fn push_token(&mut self, text: String, position: usize) {
        let collapse = text == "*" && self.tokens.last().is_some_and(|t| t.text == "*");
        if !collapse {
            self.tokens.push(Token { text, position });
        }
    }

    fn finish(mut self) -> Result<Vec<Token>, Error> {
        match self.state {
            State::InBracket { .. } => {
                let position = self.position + usize::from(self.text.starts_with('.'));
                return Err(Error::new(position, "unmatched bracket"));
            }
            State::InQuote { start } => {
                // an unterminated quote is kept as text, including the quote
                if self.text.is_empty() {
                    self.position = start;
                }
                self.text.push('"');
                let quote = std::mem::take(&mut self.quote);
                self.text.push_str(&quote);
            }
            State::Normal => {}
        }
        if !self.text.is_empty() || self.quoted {
            self.emit();
        }
        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn test(path: &str, expected: &[&str]) {
        let tokens = tokenize(path).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn tokens() {
        test("$", &["$"]);
        test("@.a", &["@", "a"]);
        test("$..author", &["$", "*", "author"]);
        test("$.store.*", &["$", "store", "*"]);
        test("$.store..price", &["$", "store", "*", "price"]);
        test("$.store.book[*].author", &["$", "store", "book[*]", "author"]);
        test("$..book[2]", &["$", "*", "book[2]"]);
        test("$..book[(@.length-1)]", &["$", "*", "book[(@.length-1)]"]);
        test("$..book[0,1]", &["$", "*", "book[0,1]"]);
        test("$..book[:2]", &["$", "*", "book[:2]"]);
        test("$..book[?(@.isbn)]", &["$", "*", "book[?(@.isbn)]"]);
        test(
            "$.store.book[?(@.price < 10)]",
            &["$", "store", "book[?(@.price < 10)]"],
        );
        test(
            "$..book[?(@.price <= $.expensive)]",
            &["$", "*", "book[?(@.price <= $.expensive)]"],
        );
        test(
            "$..book[?(@.author =~ /.*REES/i)]",
            &["$", "*", "book[?(@.author =~ /.*REES/i)]"],
        );
        test(
            r"$..book[?(@.author =~ /.*REES\]/i)]",
            &["$", "*", r"book[?(@.author =~ /.*REES\]/i)]"],
        );
        test("$..*", &["$", "*"]);
        test("$....author", &["$", "*", "author"]);
        test("$.*..a", &["$", "*", "a"]);
        test("$[0].[0].test", &["$", "[0]", "[0]", "test"]);
        test("$[?(@.a[0] > 1)].b", &["$", "[?(@.a[0] > 1)]", "b"]);
        test("$.a.", &["$", "a"]);
    }

    #[test]
    fn quoted() {
        test(r#"$."col""#, &["$", "col"]);
        test(
            r#"$."col.with.dots"."sub.with.dots""#,
            &["$", "col.with.dots", "sub.with.dots"],
        );
        test(
            r#"$."col with spaces"."sub with spaces""#,
            &["$", "col with spaces", "sub with spaces"],
        );
        test(r#"$."store"."book"[0]."price""#, &["$", "store", "book[0]", "price"]);
        test(r#"$."unterminated"#, &["$", r#""unterminated"#]);
        test(r#"$."""#, &["$", ""]);
    }

    #[test]
    fn positions() {
        let tokens = tokenize("$.store.book[0]").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, [0, 2, 8]);
    }

    #[test]
    fn errors() {
        assert_eq!(tokenize("").unwrap_err().position(), 0);
        assert_eq!(tokenize("store.book").unwrap_err().position(), 0);
        assert_eq!(
            tokenize("$.book[0").unwrap_err().to_string(),
            "at position 2, unmatched bracket"
        );
    }
}
