use std::collections::BTreeMap;

use shared::domain::{GuessFeedback, LetterClass};

pub const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// Strongest classification observed per letter during the current round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardOverlay {
    letters: BTreeMap<char, LetterClass>,
}

impl KeyboardOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one guess into the overlay and returns the letters whose
    /// classification got stronger. A stored class is only ever replaced by a
    /// strictly stronger one.
    pub fn merge(&mut self, feedback: &GuessFeedback) -> Vec<(char, LetterClass)> {
        let mut upgraded = Vec::new();
        for (letter, class) in feedback.iter() {
            let previous = self.letters.get(&letter).copied();
            if previous.is_some_and(|prev| class <= prev) {
                continue;
            }
            self.letters.insert(letter, class);
            match upgraded.iter_mut().find(|(seen, _)| *seen == letter) {
                Some(entry) => *entry = (letter, class),
                None => upgraded.push((letter, class)),
            }
        }
        upgraded
    }

    pub fn reset(&mut self) {
        self.letters.clear();
    }

    pub fn get(&self, letter: char) -> Option<LetterClass> {
        self.letters.get(&letter.to_ascii_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, LetterClass)> + '_ {
        self.letters.iter().map(|(letter, class)| (*letter, *class))
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn rows(&self) -> Vec<Vec<(char, Option<LetterClass>)>> {
        KEYBOARD_ROWS
            .iter()
            .map(|row| row.chars().map(|letter| (letter, self.get(letter))).collect())
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/overlay_tests.rs"]
mod tests;
