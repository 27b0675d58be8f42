use std::collections::VecDeque;

/// Bounded FIFO of the most recent numbers read for one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberHistory {
    capacity: usize,
    readings: VecDeque<String>,
}

impl NumberHistory {
    /// A zero capacity is raised to 1 so the latest reading is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    pub fn with_first(capacity: usize, number: impl Into<String>) -> Self {
        let mut history = Self::new(capacity);
        history.push(number);
        history
    }

    /// Append a reading, evicting the oldest one when full.
    pub fn push(&mut self, number: impl Into<String>) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(number.into());
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.readings.iter().map(String::as_str)
    }

    pub fn vote(&self) -> Option<(&str, usize)> {
        majority_vote(self.iter())
    }
}

/// Most frequent reading and its count.
///
/// Ties go to the number whose first occurrence comes earliest.
pub fn majority_vote<'a, I>(readings: I) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    // first-occurrence order; histories are short enough for a linear scan
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for reading in readings {
        match counts.iter_mut().find(|(n, _)| *n == reading) {
            Some((_, count)) => *count += 1,
            None => counts.push((reading, 1)),
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (number, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((number, count));
        }
    }
    best
}
