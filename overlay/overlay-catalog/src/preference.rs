//! Dietary preferences and product warnings.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::ProductRecord;

/// A restriction the viewer has opted into.
///
/// Declaration order is the order warnings are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PreferenceTag {
    /// Avoids gluten.
    Gluten,
    /// Avoids lactose.
    Lactose,
    /// Avoids meat.
    Meat,
}

impl PreferenceTag {
    /// Every tag, in reporting order.
    pub const ALL: [Self; 3] = [Self::Gluten, Self::Lactose, Self::Meat];

    /// Ingredient keywords that implicate this restriction.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Gluten => &["wheat"],
            Self::Lactose => &["milk", "cheese", "butter"],
            Self::Meat => &["beef", "chicken", "pork"],
        }
    }

    /// Name shown on the warning line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gluten => "Gluten",
            Self::Lactose => "Lactose",
            Self::Meat => "Meat",
        }
    }

    /// Returns true if any ingredient contains one of this tag's keywords,
    /// ignoring case.
    #[must_use]
    pub fn implicated_by<'a, I>(self, ingredients: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        ingredients.into_iter().any(|ingredient| {
            let ingredient = ingredient.to_lowercase();
            self.keywords().iter().any(|kw| ingredient.contains(kw))
        })
    }
}

impl fmt::Display for PreferenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The set of restrictions the viewer has enabled.
///
/// Owned by the settings layer and read here without mutation.
///
/// ```
/// use overlay_catalog::{PreferenceSet, PreferenceTag};
///
/// let prefs = PreferenceSet::from_tags([PreferenceTag::Lactose]);
/// assert!(prefs.is_enabled(PreferenceTag::Lactose));
/// assert!(!prefs.is_enabled(PreferenceTag::Meat));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    enabled: BTreeSet<PreferenceTag>,
}

impl PreferenceSet {
    /// No restrictions enabled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Enables exactly the given tags.
    #[must_use]
    pub fn from_tags(tags: impl IntoIterator<Item = PreferenceTag>) -> Self {
        Self {
            enabled: tags.into_iter().collect(),
        }
    }

    /// Enables or disables one tag.
    pub fn set(&mut self, tag: PreferenceTag, enabled: bool) {
        if enabled {
            self.enabled.insert(tag);
        } else {
            self.enabled.remove(&tag);
        }
    }

    /// Returns true if `tag` is enabled.
    #[must_use]
    pub fn is_enabled(&self, tag: PreferenceTag) -> bool {
        self.enabled.contains(&tag)
    }

    /// Enabled tags in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = PreferenceTag> + '_ {
        self.enabled.iter().copied()
    }

    /// Returns true if nothing is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

/// Lists the enabled restrictions that `record`'s ingredients implicate.
///
/// Pure: neither the record nor the preferences are touched.
///
/// # Example
///
/// ```
/// use overlay_catalog::{warnings_for, PreferenceSet, PreferenceTag, ProductRecord};
///
/// let bread = ProductRecord::new("2345678901234", "White Bread", 2.29)
///     .with_ingredients(["wheat flour", "water", "yeast"]);
/// let prefs = PreferenceSet::from_tags([PreferenceTag::Gluten, PreferenceTag::Meat]);
///
/// assert_eq!(warnings_for(&bread, &prefs), vec!["Gluten".to_string()]);
/// ```
#[must_use]
pub fn warnings_for(record: &ProductRecord, enabled: &PreferenceSet) -> Vec<String> {
    enabled
        .iter()
        .filter(|tag| tag.implicated_by(&record.ingredients))
        .map(|tag| tag.label().to_string())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(ingredients: &[&str]) -> ProductRecord {
        ProductRecord::new("1", "Test", 1.0).with_ingredients(ingredients.iter().copied())
    }

    #[test]
    fn wheat_triggers_gluten() {
        let prefs = PreferenceSet::from_tags([PreferenceTag::Gluten]);
        assert_eq!(warnings_for(&record(&["wheat"]), &prefs), vec!["Gluten"]);
    }

    #[test]
    fn no_preferences_no_warnings() {
        assert!(warnings_for(&record(&["water"]), &PreferenceSet::none()).is_empty());
        assert!(warnings_for(&record(&["wheat", "milk"]), &PreferenceSet::none()).is_empty());
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let prefs = PreferenceSet::from_tags([PreferenceTag::Lactose]);
        assert_eq!(
            warnings_for(&record(&["Salted BUTTER"]), &prefs),
            vec!["Lactose"]
        );
        assert_eq!(warnings_for(&record(&["buttermilk"]), &prefs), vec!["Lactose"]);
    }

    #[test]
    fn warnings_follow_declaration_order() {
        let prefs = PreferenceSet::from_tags(PreferenceTag::ALL);
        let pizza = record(&["pork sausage", "cheese", "wheat flour"]);
        assert_eq!(warnings_for(&pizza, &prefs), vec!["Gluten", "Lactose", "Meat"]);
    }

    #[test]
    fn disabled_tags_are_ignored() {
        let mut prefs = PreferenceSet::from_tags(PreferenceTag::ALL);
        prefs.set(PreferenceTag::Meat, false);
        assert!(warnings_for(&record(&["chicken"]), &prefs).is_empty());
        assert!(!prefs.is_empty());
    }

    #[test]
    fn preference_set_serde_is_a_list() {
        let prefs = PreferenceSet::from_tags([PreferenceTag::Meat, PreferenceTag::Gluten]);
        let json = serde_json::to_string(&prefs).unwrap();
        assert_eq!(json, r#"["Gluten","Meat"]"#);
        let back: PreferenceSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prefs);
    }
}
