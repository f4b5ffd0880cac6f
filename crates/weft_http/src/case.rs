//! Name case conversion.
//!
//! Names are split into lowercase components on separators and case
//! transitions, then rejoined in the requested convention:
//!
//! ```
//! use weft_http::case::parse_case;
//!
//! let name = parse_case("HTTPResponseCode");
//! assert_eq!(name.components(), ["http", "response", "code"]);
//! assert_eq!(name.kebab_case(), "http-response-code");
//! assert_eq!(name.camel_case(), "httpResponseCode");
//! ```

/// A name split into lowercase components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReCase {
    components: Vec<String>,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '_' | '-' | '.' | '/' | '\\')
}

/// Splits a name in any convention into components.
///
/// Runs of capitals stay together as an acronym, except that the last capital
/// before a lowercase letter starts the next component (`OpenAIContext` is
/// `open`, `ai`, `context`). Leading underscores are kept as their own first
/// component so they survive every conversion.
#[must_use]
pub fn parse_case(name: &str) -> ReCase {
    let chars: Vec<char> = name.chars().collect();
    let mut components = Vec::new();
    let mut current = String::new();
    let mut in_acronym = false;
    let mut in_leading_underscore = false;

    for (i, &c) in chars.iter().enumerate() {
        if components.is_empty() && c == '_' && current.chars().all(|x| x == '_') {
            in_leading_underscore = true;
            current.push(c);
            continue;
        }
        if in_leading_underscore {
            in_leading_underscore = false;
            components.push(std::mem::take(&mut current));
        }

        if is_separator(c) {
            if !current.is_empty() {
                components.push(std::mem::take(&mut current));
            }
            in_acronym = false;
            continue;
        }

        if !c.is_lowercase() && !c.is_ascii_digit() {
            let restart = in_acronym
                && c.is_uppercase()
                && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if !current.is_empty() && (restart || !in_acronym) {
                components.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
        in_acronym = c.is_uppercase();
    }

    if !current.is_empty() {
        components.push(current);
    }
    ReCase { components }
}

fn capitalize(component: &str) -> String {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ReCase {
    /// Returns the components.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    fn has_leading_underscores(&self) -> bool {
        self.components.first().is_some_and(|c| c.starts_with('_'))
    }

    /// Joins the components with a separator. Leading underscores are not
    /// followed by the separator.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        match self.components.split_first() {
            Some((first, rest)) if self.has_leading_underscores() => {
                format!("{first}{}", rest.join(separator))
            }
            _ => self.components.join(separator),
        }
    }

    /// `kebab-case`
    #[must_use]
    pub fn kebab_case(&self) -> String {
        self.join("-")
    }

    /// `snake_case`
    #[must_use]
    pub fn snake_case(&self) -> String {
        self.join("_")
    }

    /// `camelCase`
    #[must_use]
    pub fn camel_case(&self) -> String {
        let keep = if self.has_leading_underscores() { 2 } else { 1 };
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| if i < keep { c.clone() } else { capitalize(c) })
            .collect()
    }

    /// `PascalCase`
    #[must_use]
    pub fn pascal_case(&self) -> String {
        self.components.iter().map(|c| capitalize(c)).collect()
    }
}
