//! Localization lookup boundary.
//!
//! Command replies and operator-facing messages go through `translate` so a
//! language file can override any key. Unknown keys echo back the key
//! itself, which keeps missing translations visible without crashing.

use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Key → localized string table with positional `{0}`-style substitution.
#[derive(Debug)]
pub struct I18n {
    strings: HashMap<String, String>,
}

impl I18n {
    /// Built-in English strings; the shipped default.
    pub fn builtin() -> Self {
        let strings = [
            ("command.unknown", "Unknown command: {0}"),
            ("command.no_permission", "You do not have permission to use this command"),
            ("command.not_logged_in", "You must be logged in to use commands"),
            ("command.target_offline", "Target player {0} is not online"),
            ("give.desc", "Give items to a player"),
            ("give.usage", "Usage: /give material|fragment <id> <quantity> [@uid]"),
            ("give.item_not_exist", "Item does not exist"),
            ("give.invalid_quantity", "Invalid quantity"),
            ("give.success", "Gave {0} x {1} to {2}"),
            ("help.desc", "List available commands"),
            ("help.usage", "Usage: /help"),
            ("help.entry", "/{0} {1} - {2}"),
        ];
        Self {
            strings: strings
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Builtin strings overlaid with entries from a JSON language file.
    ///
    /// A missing file just means no overrides; a malformed one is logged
    /// and ignored since localization is never worth failing startup over.
    pub fn load(path: &Path) -> Self {
        let mut table = Self::builtin();
        if !path.exists() {
            return table;
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(overrides) => table.strings.extend(overrides),
                Err(e) => warn!("Ignoring malformed language file {}: {e}", path.display()),
            },
            Err(e) => warn!("Ignoring unreadable language file {}: {e}", path.display()),
        }
        table
    }

    pub fn translate(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Translates `key` and substitutes `{0}`, `{1}`, ... with `args`.
    pub fn translate_args(&self, key: &str, args: &[&str]) -> String {
        let mut out = self.translate(key);
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), arg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_echoes_key() {
        let i18n = I18n::builtin();
        assert_eq!(i18n.translate("no.such.key"), "no.such.key");
    }

    #[test]
    fn positional_substitution() {
        let i18n = I18n::builtin();
        let msg = i18n.translate_args("give.success", &["5", "Crystal", "Captain1"]);
        assert_eq!(msg, "Gave 5 x Crystal to Captain1");
    }

    #[test]
    fn file_overrides_builtin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lang.json");
        std::fs::write(&path, r#"{"give.item_not_exist": "Kein Gegenstand"}"#).expect("write");
        let i18n = I18n::load(&path);
        assert_eq!(i18n.translate("give.item_not_exist"), "Kein Gegenstand");
        assert_eq!(
            i18n.translate("command.no_permission"),
            "You do not have permission to use this command"
        );
    }
}
