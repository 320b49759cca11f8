//! Code Snippets
//!
//! Listings the bug hides in. A library is a JSON array of
//! `{lines, language, filename}` objects; the scan only cares how many
//! lines a listing has.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::rng::RandomSource;

/// A code listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Source lines, in order.
    pub lines: Vec<String>,
    /// Language name, e.g. "python".
    pub language: String,
    /// Display filename.
    pub filename: String,
}

impl Snippet {
    /// Build a snippet by splitting `code` on newlines.
    pub fn from_code(code: &str, language: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            lines: code.split('\n').map(str::to_string).collect(),
            language: language.into(),
            filename: filename.into(),
        }
    }

    /// Number of lines.
    pub fn line_count(&self) -> i32 {
        i32::try_from(self.lines.len()).unwrap_or(i32::MAX)
    }
}

/// Snippet loading errors.
#[derive(Debug, Error)]
pub enum SnippetError {
    /// File could not be read.
    #[error("failed to read snippet library: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a JSON array of snippets.
    #[error("invalid snippet library: {0}")]
    Parse(#[from] serde_json::Error),

    /// Library holds no snippets.
    #[error("snippet library is empty")]
    Empty,
}

/// A non-empty set of snippets to pick from.
#[derive(Clone, Debug)]
pub struct SnippetLibrary {
    snippets: Vec<Snippet>,
}

impl SnippetLibrary {
    /// Wrap a list of snippets.
    pub fn new(snippets: Vec<Snippet>) -> Result<Self, SnippetError> {
        if snippets.is_empty() {
            return Err(SnippetError::Empty);
        }
        Ok(Self { snippets })
    }

    /// Parse a JSON array of snippets.
    pub fn from_json_str(json: &str) -> Result<Self, SnippetError> {
        let snippets: Vec<Snippet> = serde_json::from_str(json)?;
        Self::new(snippets)
    }

    /// Load a JSON snippet file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnippetError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pick a snippet uniformly at random.
    pub fn choose<R: RandomSource>(&self, rng: &mut R) -> &Snippet {
        let idx = rng.next_index(self.snippets.len());
        &self.snippets[idx.min(self.snippets.len() - 1)]
    }

    /// All snippets.
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }
}

impl Default for SnippetLibrary {
    fn default() -> Self {
        Self {
            snippets: vec![
                Snippet::from_code(BUILTIN_PYTHON, "python", "inventory.py"),
                Snippet::from_code(BUILTIN_JAVASCRIPT, "javascript", "App.js"),
                Snippet::from_code(BUILTIN_RUST, "rust", "parser.rs"),
            ],
        }
    }
}

const BUILTIN_PYTHON: &str = r#"import json
from typing import Dict, List

MAX_STOCK = 500


class Inventory:
    def __init__(self) -> None:
        self.items: Dict[str, int] = {}

    def add(self, name: str, count: int) -> None:
        current = self.items.get(name, 0)
        self.items[name] = min(MAX_STOCK, current + count)

    def remove(self, name: str, count: int) -> bool:
        current = self.items.get(name, 0)
        if current < count:
            return False
        self.items[name] = current - count
        return True

    def low_stock(self, threshold: int) -> List[str]:
        return [n for n, c in self.items.items() if c < threshold]

    def to_json(self) -> str:
        return json.dumps(self.items, sort_keys=True)


def main() -> None:
    inv = Inventory()
    inv.add("bolts", 120)
    inv.add("nuts", 80)
    inv.remove("bolts", 20)
    print(inv.low_stock(100))
    print(inv.to_json())


if __name__ == "__main__":
    main()"#;

const BUILTIN_JAVASCRIPT: &str = r#"import React, { useState, useEffect } from 'react';
import './App.css';

const POLL_MS = 1000;

function App() {
  const [count, setCount] = useState(0);
  const [items, setItems] = useState([]);

  useEffect(() => {
    const timer = setInterval(() => {
      setCount((c) => c + 1);
    }, POLL_MS);
    return () => clearInterval(timer);
  }, []);

  const addItem = (name) => {
    setItems((prev) => [...prev, { id: prev.length, name }]);
  };

  return (
    <div className="app">
      <h1>Ticks: {count}</h1>
      <button onClick={() => addItem('item')}>Add</button>
      <ul>
        {items.map((item) => (
          <li key={item.id}>{item.name}</li>
        ))}
      </ul>
    </div>
  );
}

export default App;"#;

const BUILTIN_RUST: &str = r#"use std::collections::HashMap;

#[derive(Debug)]
pub enum Token {
    Number(f64),
    Ident(String),
    Op(char),
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut num = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(num.parse().unwrap_or(0.0)));
        } else if c.is_alphabetic() {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(ident));
        } else if "+-*/".contains(c) {
            tokens.push(Token::Op(c));
            chars.next();
        } else {
            chars.next();
        }
    }
    tokens
}

pub fn count_idents(tokens: &[Token]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        if let Token::Ident(name) = token {
            *counts.entry(name.clone()).or_insert(0) += 1;
        }
    }
    counts
}"#;
