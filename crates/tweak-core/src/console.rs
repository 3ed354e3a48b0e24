//! The console — a bounded log of printed lines.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Console {
    lines: VecDeque<String>,
}

impl Console {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: VecDeque::new(),
        }
    }

    /// Append `text` (split on newlines), then drop the oldest lines until
    /// at most `limit` remain.
    pub fn print_with_limit(&mut self, text: &str, limit: usize) {
        if text.is_empty() {
            self.lines.push_back(String::new());
        } else {
            self.lines.extend(text.lines().map(str::to_string));
        }
        while self.lines.len() > limit {
            self.lines.pop_front();
        }
    }

    /// Discard all history, leaving a single empty line.
    pub fn clear(&mut self) {
        self.print_with_limit("", 1);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn limit_drops_oldest() {
        let mut console = Console::new();
        console.print_with_limit("one\ntwo", 10);
        console.print_with_limit("three", 2);
        assert_eq!(console.lines().collect::<Vec<_>>(), ["two", "three"]);
    }

    #[test]
    fn clear_leaves_one_blank_line() {
        let mut console = Console::new();
        console.print_with_limit("a\nb\nc", 100);
        console.clear();
        assert_eq!(console.lines().collect::<Vec<_>>(), [""]);
    }
}
