//! Multi-value filter selections.

/// A filter field that may hold nothing, one value or several.
///
/// `Many` always holds at least two distinct values; constructors collapse
/// smaller sets into `None` or `One`, so two selections with the same
/// values compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    None,
    One(T),
    Many(Vec<T>),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::None
    }
}

impl<T: PartialEq> Selection<T> {
    /// Build a selection from values in order, dropping duplicates.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let mut unique: Vec<T> = Vec::new();
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self::from_unique(unique)
    }

    fn from_unique(mut values: Vec<T>) -> Self {
        match values.len() {
            0 => Self::None,
            1 => values.pop().map_or(Self::None, Self::One),
            _ => Self::Many(values),
        }
    }

    /// Selected values in order.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::None => &[],
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.as_slice().contains(value)
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Add `value` if absent, remove it if present.
    ///
    /// This is what a sidebar checkbox does.
    #[must_use]
    pub fn toggled(self, value: T) -> Self {
        let mut values = self.into_vec();
        if let Some(index) = values.iter().position(|v| *v == value) {
            values.remove(index);
        } else {
            values.push(value);
        }
        Self::from_unique(values)
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::None => Vec::new(),
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T: PartialEq> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Self::One)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_collapses() {
        assert_eq!(Selection::<i64>::from_values([]), Selection::None);
        assert_eq!(Selection::from_values([3, 3]), Selection::One(3));
        assert_eq!(
            Selection::from_values([1, 2, 1]),
            Selection::Many(vec![1, 2])
        );
    }

    #[test]
    fn test_toggled_adds_and_removes() {
        let selection = Selection::None.toggled(1);
        assert_eq!(selection, Selection::One(1));

        let selection = selection.toggled(2);
        assert_eq!(selection.as_slice(), &[1, 2]);

        let selection = selection.toggled(1);
        assert_eq!(selection, Selection::One(2));

        assert!(selection.toggled(2).is_none());
    }

    #[test]
    fn test_contains() {
        let selection = Selection::from_values([4, 5]);
        assert!(selection.contains(&5));
        assert!(!selection.contains(&6));
        assert!(!Selection::<i64>::None.contains(&4));
    }
}
