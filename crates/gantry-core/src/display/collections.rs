//! Collection wrapper types for displaying groups of date changes.

use std::fmt;

use crate::models::DateUpdate;

/// Newtype wrapper for displaying the updates produced by a structural
/// edit.
///
/// # Examples
///
/// ```rust
/// use gantry_core::{display::Updates, models::DateUpdate};
/// use jiff::civil::date;
///
/// let updates = Updates(vec![DateUpdate {
///     id: "t1".to_string(),
///     start_date: date(2025, 1, 5),
///     end_date: Some(date(2025, 1, 7)),
///     duration: Some(2),
/// }]);
/// assert!(updates.to_string().contains("`t1`: 2025-01-05 → 2025-01-07 (2d)"));
/// ```
pub struct Updates(pub Vec<DateUpdate>);

impl Updates {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DateUpdate> {
        self.0.iter()
    }
}

impl IntoIterator for Updates {
    type Item = DateUpdate;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Updates {
    type Item = &'a DateUpdate;
    type IntoIter = std::slice::Iter<'a, DateUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- `{}`: {}", self.id, self.start_date)?;
        if let Some(end) = self.end_date {
            write!(f, " → {end}")?;
        }
        if let Some(days) = self.duration {
            write!(f, " ({days}d)")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Updates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No dates changed.");
        }
        writeln!(f, "Updated {} entries:", self.0.len())?;
        writeln!(f)?;
        for update in &self.0 {
            write!(f, "{update}")?;
        }
        Ok(())
    }
}
