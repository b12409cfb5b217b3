//! Localization for `kampuslink-ui`.
//!
//! Built on `i18n-embed` (language selection and loading), `fluent` (message
//! formatting), `rust-embed` (the `.ftl` files are compiled in) and
//! `i18n-embed-fl` (the `fl!` macro checks message ids at compile time).
//!
//! ```text
//! i18n.toml
//! i18n/
//!   id-ID/kampuslink_ui.ftl   (fallback, reference wording)
//!   en-US/kampuslink_ui.ftl
//! ```
//!
//! Call [`init`] once at start-up, then look strings up with [`t!`](crate::t):
//! ```ignore
//! ui::i18n::init();
//! let title = ui::t!("dashboard-title");
//! ```
//!
//! A new locale is a copy of `id-ID/kampuslink_ui.ftl` under its own tag with
//! every value translated; ids and placeholders stay the same. The
//! `i18n_missing_keys` test fails when a locale lags behind the fallback.
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::LanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl; // Re-export for convenience.

/// Ergonomic translation macro.
/// Examples:
///     t!("nav-dashboard")
///     t!("source-uploaded", name = file_name, rows = 12)
///
/// This expands to `fl!(&*LOADER, ...)` keeping callsites short while
/// ensuring all lookups route through the shared loader.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fluent domain; also the file name of every locale's `.ftl`.
const DOMAIN: &str = "kampuslink_ui";

/// Locale whose file is the reference for all others.
pub const FALLBACK_LANGUAGE: &str = "id-ID";

/// Embed all locale folders under `i18n/`.
#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

/// Global language loader used with the `fl!` macro.
pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = FALLBACK_LANGUAGE
        .parse()
        .unwrap_or_else(|_| LanguageIdentifier::default());
    FluentLanguageLoader::new(DOMAIN, fallback)
});

static INIT: Once = Once::new();

/// Initialize i18n (idempotent).
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        if let Err(err) = i18n_embed::select(&*LOADER, &Localizations, &requested) {
            tracing::warn!("i18n: language selection failed ({err}); using {FALLBACK_LANGUAGE}");
        }
    });
}

/// Switch language at runtime. Unparsable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        return Ok(());
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// Tag of the language currently used for lookups.
pub fn current_language() -> String {
    LOADER.current_language().to_string()
}

/// List available (embedded) language identifiers.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}
