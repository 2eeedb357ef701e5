//! Character id → display name lookup.

use std::collections::HashMap;

/// The roster shipped with the game.
const BUILTIN: &[(&str, &str)] = &[
    ("achilles", "Achilles"),
    ("joan", "Joan of Arc"),
    ("holmes", "Sherlock Holmes"),
    ("dracula", "Dracula"),
    ("sun_wukong", "Sun Wukong"),
    ("cleopatra", "Cleopatra"),
    ("tesla", "Nikola Tesla"),
    ("merlin", "Merlin"),
    ("billy_the_kid", "Billy the Kid"),
    ("genghis_khan", "Genghis Khan"),
    ("fenrir", "Fenrir"),
    ("frankenstein", "Frankenstein"),
];

/// Display names for character ids. Unknown ids render as themselves.
#[derive(Debug, Clone)]
pub struct CharacterNames {
    names: HashMap<String, String>,
}

impl Default for CharacterNames {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CharacterNames {
    /// The built-in roster.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN
                .iter()
                .map(|(id, name)| ((*id).to_string(), (*name).to_string()))
                .collect(),
        }
    }

    /// Add or override entries.
    #[must_use]
    pub fn with_names<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.names
            .extend(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Display name for `id`, or `id` itself.
    #[must_use]
    pub fn display<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map_or(id, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve_and_unknown_fall_back() {
        let names = CharacterNames::builtin();
        assert_eq!(names.display("joan"), "Joan of Arc");
        assert_eq!(names.display("space_pirate"), "space_pirate");
    }

    #[test]
    fn extra_entries_override_builtin() {
        let names = CharacterNames::builtin().with_names([("joan", "Jeanne"), ("rilla", "Rilla")]);
        assert_eq!(names.display("joan"), "Jeanne");
        assert_eq!(names.display("rilla"), "Rilla");
    }
}
