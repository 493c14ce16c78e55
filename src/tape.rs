//! An unbounded, bidirectional tape.
//!
//! Only cells the head has visited are materialized. They are kept in a double-ended queue
//! that covers a contiguous range of indices around the head; stepping past either end of that
//! range materializes one blank cell there.

use crate::types::{Direction, WILDCARD};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<char>,
    /// Index of `cells[0]`.
    start: isize,
    head: isize,
    blank: char,
}

impl Tape {
    /// Creates a tape holding `word` at indices `0..word.len()` with the head on index 0.
    /// An empty word yields a single blank cell.
    pub fn new(blank: char, word: &str) -> Self {
        let mut cells: VecDeque<char> = word.chars().collect();
        if cells.is_empty() {
            cells.push_back(blank);
        }

        Self {
            cells,
            start: 0,
            head: 0,
            blank,
        }
    }

    /// Creates a blank tape.
    pub fn empty(blank: char) -> Self {
        Self::new(blank, "")
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the index of the cell under the head.
    pub fn head(&self) -> isize {
        self.head
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> char {
        self.cells
            .get(self.offset())
            .copied()
            .unwrap_or(self.blank)
    }

    /// Overwrites the symbol under the head. Writing the wildcard leaves the cell unchanged.
    pub fn write(&mut self, symbol: char) {
        if symbol == WILDCARD {
            return;
        }

        let offset = self.offset();
        if let Some(cell) = self.cells.get_mut(offset) {
            *cell = symbol;
        }
    }

    /// Moves the head one cell, materializing a blank cell when it leaves the visited range.
    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.head == self.start {
                    self.cells.push_front(self.blank);
                    self.start -= 1;
                }
                self.head -= 1;
            }
            Direction::Right => {
                if self.head == self.end() {
                    self.cells.push_back(self.blank);
                }
                self.head += 1;
            }
            Direction::Stay => {}
        }
    }

    /// Drops blank cells from both ends of the materialized range, stopping at the head.
    pub fn compact(&mut self) {
        while self.start < self.head && self.cells.front() == Some(&self.blank) {
            self.cells.pop_front();
            self.start += 1;
        }

        while self.end() > self.head && self.cells.back() == Some(&self.blank) {
            self.cells.pop_back();
        }
    }

    /// Compacts the tape and returns every materialized cell with its index, left to right.
    pub fn cells(&mut self) -> Vec<(char, isize)> {
        self.compact();
        self.cells.iter().copied().zip(self.start..).collect()
    }

    /// Returns the tape content without leading and trailing blanks.
    pub fn content(&self) -> String {
        let content: String = self.cells.iter().collect();
        content.trim_matches(self.blank).to_string()
    }

    /// Index of the rightmost materialized cell.
    fn end(&self) -> isize {
        self.start + self.cells.len() as isize - 1
    }

    fn offset(&self) -> usize {
        (self.head - self.start) as usize
    }
}
