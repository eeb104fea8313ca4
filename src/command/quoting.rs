//! Quoting of JSON payload tokens.
//!
//! `cmd.exe` strips unescaped double quotes from arguments, so a JSON
//! document handed to `kubectl` arrives mangled unless every `"` is escaped.
//! Other platforms pass argv through untouched.

use std::borrow::Cow;

/// How a JSON-carrying argument is rewritten before it lands in the argv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotingPolicy {
    /// Pass the payload through unchanged.
    #[default]
    Verbatim,
    /// Escape every `"` as `\"` for the Windows command shell.
    EscapeDoubleQuotes,
}

impl QuotingPolicy {
    /// Select the policy for the platform this binary was built for.
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::EscapeDoubleQuotes
        } else {
            Self::Verbatim
        }
    }

    /// Apply the policy to a JSON payload.
    pub fn quote_json<'a>(&self, json: &'a str) -> Cow<'a, str> {
        match self {
            Self::Verbatim => Cow::Borrowed(json),
            Self::EscapeDoubleQuotes if json.contains('"') => {
                Cow::Owned(json.replace('"', "\\\""))
            }
            Self::EscapeDoubleQuotes => Cow::Borrowed(json),
        }
    }
}
