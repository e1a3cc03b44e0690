use std::borrow::Cow;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

/// Matches `${name}` tokens. The name may contain anything but a closing brace.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(?<name>[^}]*)\}").expect("a valid regex"));

/// Replaces every `${key}` token of `text` with the value mapped to `key`.
///
/// The replacement is a single pass over the input: a value inserted for one key is
/// never scanned again, so substitution is not recursive. Tokens whose key is not in
/// the map are kept verbatim.
///
/// ```rust
/// use indexmap::IndexMap;
/// use restcall_core::substitute;
///
/// let mut placeholders = IndexMap::new();
/// placeholders.insert("a".to_string(), "${b}".to_string());
/// placeholders.insert("b".to_string(), "X".to_string());
///
/// assert_eq!(substitute("${a}/${b}", &placeholders), "${b}/X");
/// ```
pub fn substitute<'a>(text: &'a str, placeholders: &IndexMap<String, String>) -> Cow<'a, str> {
    if placeholders.is_empty() {
        return Cow::Borrowed(text);
    }

    RE.replace_all(text, |caps: &Captures<'_>| {
        let token = caps.get(0).map_or("", |it| it.as_str());
        caps.name("name")
            .and_then(|name| placeholders.get(name.as_str()))
            .map_or_else(|| token.to_string(), Clone::clone)
    })
}

/// Same as [`substitute`] for optional text: unset input yields unset output.
pub fn substitute_opt(
    text: Option<&str>,
    placeholders: &IndexMap<String, String>,
) -> Option<String> {
    text.map(|it| substitute(it, placeholders).into_owned())
}
