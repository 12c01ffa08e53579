//! Locale resolution for rendering.
//!
//! The hosting pipeline records the language of the current request in a
//! thread-scoped holder ([`set_language`]). Writers read it through a
//! [`LocaleSource`]; when nothing is set, the process default is used.

use std::cell::RefCell;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A language tag such as `en-US` or `ja`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Creates a locale from a tag. Underscores are normalized to hyphens.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().replace('_', "-"))
    }

    /// Parses a POSIX locale string such as `ja_JP.UTF-8` or `de_DE@euro`.
    ///
    /// Returns `None` for empty values and the `C`/`POSIX` pseudo-locales.
    pub fn from_posix(value: &str) -> Option<Self> {
        let tag = value
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if tag.is_empty() || tag == "C" || tag == "POSIX" {
            return None;
        }
        Some(Self::new(tag))
    }

    /// The process-wide default locale.
    ///
    /// Read once from `LC_ALL`, `LC_MESSAGES` or `LANG` (first usable value),
    /// falling back to `en`.
    pub fn system_default() -> Locale {
        SYSTEM_DEFAULT.clone()
    }

    /// The language tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag (`en` for `en-US`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static SYSTEM_DEFAULT: Lazy<Locale> = Lazy::new(|| {
    detect_from_env(|name| std::env::var(name).ok()).unwrap_or_else(|| Locale::new("en"))
});

fn detect_from_env(var: impl Fn(&str) -> Option<String>) -> Option<Locale> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|name| var(name))
        .find_map(|value| Locale::from_posix(&value))
}

thread_local! {
    static LANGUAGE: RefCell<Option<Locale>> = const { RefCell::new(None) };
}

/// Sets the language for the current thread. `None` clears it.
pub fn set_language(locale: Option<Locale>) {
    LANGUAGE.with(|cell| *cell.borrow_mut() = locale);
}

/// Returns the language set for the current thread, if any.
pub fn language() -> Option<Locale> {
    LANGUAGE.with(|cell| cell.borrow().clone())
}

/// Source of the locale used for a render call.
pub trait LocaleSource: Send + Sync {
    /// The locale to render with on the calling thread.
    fn current(&self) -> Locale;
}

/// Reads the thread-scoped holder, falling back to [`Locale::system_default`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadLocale;

impl LocaleSource for ThreadLocale {
    fn current(&self) -> Locale {
        language().unwrap_or_else(Locale::system_default)
    }
}

/// Always yields the same locale.
#[derive(Debug, Clone)]
pub struct FixedLocale(pub Locale);

impl LocaleSource for FixedLocale {
    fn current(&self) -> Locale {
        self.0.clone()
    }
}
