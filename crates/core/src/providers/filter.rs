//! File name word filters shared by providers that pick among several files.

use serde::{Deserialize, Serialize};

use crate::prompt::{Prompt, ask_list};

/// Substrings a candidate file name must and must not contain.
///
/// Matching is case-sensitive; an empty filter accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameFilter {
    /// Every one of these must appear.
    #[serde(default)]
    pub must_contain: Vec<String>,
    /// None of these may appear.
    #[serde(default)]
    pub must_not_contain: Vec<String>,
}

impl NameFilter {
    /// Whether `name` contains every required word and none of the excluded ones.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.must_contain.iter().all(|word| name.contains(word.as_str()))
            && !self
                .must_not_contain
                .iter()
                .any(|word| name.contains(word.as_str()))
    }

    /// Ask for both word lists, one word per line.
    pub fn prompt(prompt: &mut dyn Prompt) -> std::io::Result<Self> {
        let must_contain = ask_list(
            prompt,
            "Words that the file must contain (one per line, enter to continue): ",
        )?;
        let must_not_contain = ask_list(
            prompt,
            "Words that the file must not contain (one per line, enter to continue): ",
        )?;
        Ok(Self {
            must_contain,
            must_not_contain,
        })
    }
}
