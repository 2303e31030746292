/// How a token matched an [`OptionSpec`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Match {
    None,
    Short,
    Long,
}

/// The two spellings of a value-taking option, e.g. `-p` and `--port`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OptionSpec {
    pub short: &'static str,
    pub long: &'static str,
}

impl OptionSpec {
    pub const fn new(short: &'static str, long: &'static str) -> Self {
        Self { short, long }
    }

    /// Tests `token` against both spellings, short form first.
    ///
    /// Both checks are prefix checks: `-p8000` matches short `p`, and
    /// `--port=8000` as well as `--portextra` match long `port`. Splitting
    /// the name from an attached value is left to the caller.
    pub fn matches(&self, token: &str) -> Match {
        if token.is_empty() {
            return Match::None;
        }

        if let Some(rest) = token.strip_prefix('-') {
            if !rest.starts_with('-') && rest.starts_with(self.short) {
                return Match::Short;
            }
        }

        if !self.long.is_empty() && token.len() >= 2 {
            if let Some(rest) = token.strip_prefix("--") {
                if rest.starts_with(self.long) {
                    return Match::Long;
                }
            }
        }

        Match::None
    }

    /// Whatever follows `-<short>` in the token, possibly empty.
    pub fn short_tail<'a>(&self, token: &'a str) -> &'a str {
        token.get(1 + self.short.len()..).unwrap_or("")
    }
}
