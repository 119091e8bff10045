//! Take/skip windows over filtered and sorted individuals

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::CEIL_TOLERANCE;
use crate::grouping::validation::ConfigIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowStyle {
    TakeIndividuals,
    SkipIndividuals,
    TakeProportion,
    SkipProportion,
}

impl WindowStyle {
    pub fn is_proportion(&self) -> bool {
        matches!(self, WindowStyle::TakeProportion | WindowStyle::SkipProportion)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, WindowStyle::SkipIndividuals | WindowStyle::SkipProportion)
    }
}

/// End of the ordered sequence a window counts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowPosition {
    #[default]
    Start,
    End,
}

/// Bounds how many of the ordered individuals are used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub name: String,
    pub style: WindowStyle,
    #[serde(default)]
    pub position: WindowPosition,
    pub value: f64,
}

impl Window {
    pub fn new(style: WindowStyle, position: WindowPosition, value: f64) -> Self {
        Self {
            name: String::new(),
            style,
            position,
            value,
        }
    }

    pub fn take(count: usize) -> Self {
        Self::new(WindowStyle::TakeIndividuals, WindowPosition::Start, count as f64)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.to_string()
        } else {
            self.name.clone()
        }
    }

    /// Count the window covers in a group of `group_size`, clamped to `[0, group_size]`
    pub fn number_to_take(&self, group_size: usize) -> usize {
        let raw = if self.style.is_proportion() {
            (self.value * group_size as f64 - CEIL_TOLERANCE).ceil()
        } else {
            self.value.trunc()
        };
        if raw.is_nan() || raw <= 0.0 {
            0
        } else {
            (raw as usize).min(group_size)
        }
    }

    /// Slice an ordered sequence. Skip styles keep the complement of the
    /// matching take.
    pub fn apply<'a, T>(&self, ordered: Vec<&'a T>) -> Vec<&'a T> {
        let len = ordered.len();
        let count = self.number_to_take(len);
        let range = match (self.style.is_skip(), self.position) {
            (false, WindowPosition::Start) => 0..count,
            (false, WindowPosition::End) => len - count..len,
            (true, WindowPosition::Start) => count..len,
            (true, WindowPosition::End) => 0..len - count,
        };
        tracing::debug!(window = %self, size = len, count, kept = range.len(), "window applied");
        ordered[range].to_vec()
    }

    pub fn validate(&self, owner: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !(self.value > 0.0) {
            issues.push(ConfigIssue::new(
                owner,
                self.label(),
                "value",
                format!("Window value [{}] must be greater than 0", self.value),
            ));
        } else if self.style.is_proportion() && self.value > 1.0 {
            issues.push(ConfigIssue::new(
                owner,
                self.label(),
                "value",
                format!(
                    "Window proportion [{}] must be no more than 1",
                    self.value
                ),
            ));
        }
        issues
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.style.is_skip() { "Skip" } else { "Take" };
        let from = match self.position {
            WindowPosition::Start => "first",
            WindowPosition::End => "last",
        };
        if self.style.is_proportion() {
            write!(f, "{} {} {}%", verb, from, self.value * 100.0)
        } else {
            write!(f, "{} {} {}", verb, from, self.value.trunc())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<u32> {
        (1..=10).collect()
    }

    fn apply(window: &Window, items: &[u32]) -> Vec<u32> {
        window.apply(items.iter().collect()).into_iter().copied().collect()
    }

    #[test]
    fn test_proportion_rounds_up() {
        let w = Window::new(WindowStyle::TakeProportion, WindowPosition::Start, 0.25);
        assert_eq!(w.number_to_take(10), 3);
        let w = Window::new(WindowStyle::TakeProportion, WindowPosition::Start, 0.3);
        assert_eq!(w.number_to_take(10), 3);
    }

    #[test]
    fn test_individuals_clamped_and_truncated() {
        assert_eq!(Window::take(5).number_to_take(3), 3);
        let w = Window::new(WindowStyle::TakeIndividuals, WindowPosition::Start, 2.9);
        assert_eq!(w.number_to_take(10), 2);
        let w = Window::new(WindowStyle::TakeIndividuals, WindowPosition::Start, -1.0);
        assert_eq!(w.number_to_take(10), 0);
    }

    #[test]
    fn test_take_and_skip_positions() {
        let items = items();
        let take_start = Window::new(WindowStyle::TakeIndividuals, WindowPosition::Start, 3.0);
        let take_end = Window::new(WindowStyle::TakeIndividuals, WindowPosition::End, 3.0);
        let skip_start = Window::new(WindowStyle::SkipIndividuals, WindowPosition::Start, 3.0);
        let skip_end = Window::new(WindowStyle::SkipIndividuals, WindowPosition::End, 3.0);
        assert_eq!(apply(&take_start, &items), vec![1, 2, 3]);
        assert_eq!(apply(&take_end, &items), vec![8, 9, 10]);
        assert_eq!(apply(&skip_start, &items), vec![4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(apply(&skip_end, &items), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_skip_proportion_is_complement() {
        let items = items();
        let take = Window::new(WindowStyle::TakeProportion, WindowPosition::End, 0.25);
        let skip = Window::new(WindowStyle::SkipProportion, WindowPosition::End, 0.25);
        let mut joined = apply(&skip, &items);
        joined.extend(apply(&take, &items));
        assert_eq!(joined, items);
    }

    #[test]
    fn test_empty_sequence() {
        let empty: Vec<u32> = Vec::new();
        assert!(apply(&Window::take(4), &empty).is_empty());
    }

    #[test]
    fn test_validate_value_ranges() {
        let zero = Window::new(WindowStyle::TakeIndividuals, WindowPosition::Start, 0.0);
        let issues = zero.validate("Farm.Herd.Cull");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "value");
        assert_eq!(issues[0].owner, "Farm.Herd.Cull");

        let big = Window::new(WindowStyle::SkipProportion, WindowPosition::Start, 1.5);
        assert_eq!(big.validate("Farm.Herd.Cull").len(), 1);

        let many = Window::new(WindowStyle::TakeIndividuals, WindowPosition::Start, 15.0);
        assert!(many.validate("Farm.Herd.Cull").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Window::take(2).to_string(), "Take first 2");
        let w = Window::new(WindowStyle::SkipProportion, WindowPosition::End, 0.5);
        assert_eq!(w.to_string(), "Skip last 50%");
    }
}
