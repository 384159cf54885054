//! Reply keyboard: rows of button labels. Pressing a button sends its label back as plain text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row; empty rows are skipped.
    pub fn row<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = buttons.into_iter().map(Into::into).collect();
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All labels, row by row.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_skips_empty() {
        let kb = Keyboard::new()
            .row(["a", "b"])
            .row(Vec::<String>::new())
            .row(["c"]);
        assert_eq!(kb.rows.len(), 2);
        assert_eq!(kb.labels().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
