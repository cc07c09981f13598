//! Field-level validation primitives shared by every form schema.
//!
//! A schema collects every failing field into [`Issues`] rather than stopping
//! at the first problem, so forms can surface all inline messages at once.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use url::Url;
use utoipa::ToSchema;

use super::Error;

/// One failing constraint.
///
/// `path` names the wire field (for example `motivation_letter` or
/// `confirmPassword`). Root-level issues, such as cross-field rules, carry no
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Issue {
    /// Dotted field path; `None` for the whole form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Human-readable problem.
    pub message: String,
}

impl Issue {
    /// Issue attached to a single field.
    pub fn field(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Issue that applies to the input as a whole.
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }
}

/// Non-empty collection of validation issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issues(Vec<Issue>);

impl Issues {
    /// Convenience for a single root-level issue.
    pub fn root(message: impl Into<String>) -> Self {
        Self(vec![Issue::root(message)])
    }

    /// Record `issue`.
    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    /// Whether no issue was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Recorded issues in order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Issues reported against `path`.
    pub fn for_field<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.0
            .iter()
            .filter(move |issue| issue.path.as_deref() == Some(path))
    }

    /// Whether any issue names `path`.
    pub fn has_field(&self, path: &str) -> bool {
        self.for_field(path).next().is_some()
    }

    /// Root-level issues.
    pub fn roots(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter().filter(|issue| issue.path.is_none())
    }

    /// Recorded issues, consuming the list.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            match &issue.path {
                Some(path) => write!(f, "{path}: {}", issue.message)?,
                None => f.write_str(&issue.message)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for Issues {}

impl From<Issues> for Error {
    fn from(issues: Issues) -> Self {
        Self::validation_failed("one or more fields are invalid")
            .with_details(json!({ "issues": issues.into_vec() }))
    }
}

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Compile `pattern` once; a pattern that fails to compile matches nothing.
fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .inspect_err(|error| error!(%error, pattern, "validation pattern failed to compile"))
            .ok()
    })
    .as_ref()
}

fn is_email(value: &str) -> bool {
    compiled(&EMAIL_RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_some_and(|re| re.is_match(value))
}

/// Separators are stripped before matching.
fn is_phone(compact: &str) -> bool {
    compiled(&PHONE_RE, r"^\+?[0-9]{7,15}$").is_some_and(|re| re.is_match(compact))
}

/// Accumulates issues while a schema checks its fields.
///
/// Every check returns `Option<T>`: `Some` when the value passed, `None` when
/// an issue was recorded. [`Validator::finish`] then builds the entity only if
/// no issue was recorded.
#[derive(Debug, Default)]
pub struct Validator {
    issues: Issues,
}

impl Validator {
    /// Validator with no issues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue against `path`.
    pub fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(Issue::field(path, message));
    }

    /// Record a root-level issue.
    pub fn fail_root(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::root(message));
    }

    /// Trimmed, non-blank text.
    pub fn required(&mut self, path: &str, value: Option<String>) -> Option<String> {
        match value.map(|raw| raw.trim().to_owned()) {
            Some(text) if !text.is_empty() => Some(text),
            _ => {
                self.fail(path, format!("{} is required", label(path)));
                None
            }
        }
    }

    /// Text whose surrounding whitespace is significant (passwords).
    pub fn required_raw(&mut self, path: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(text) if !text.is_empty() => Some(text),
            _ => {
                self.fail(path, format!("{} is required", label(path)));
                None
            }
        }
    }

    /// Optional text; blank input is treated as absent.
    pub fn optional(value: Option<String>) -> Option<String> {
        value
            .map(|raw| raw.trim().to_owned())
            .filter(|text| !text.is_empty())
    }

    /// Character-count bounds, inclusive.
    pub fn length(&mut self, path: &str, value: String, min: usize, max: usize) -> Option<String> {
        let count = value.chars().count();
        if count < min {
            self.fail(
                path,
                format!("{} must be at least {min} characters", label(path)),
            );
            return None;
        }
        if count > max {
            self.fail(
                path,
                format!("{} must be at most {max} characters", label(path)),
            );
            return None;
        }
        Some(value)
    }

    /// Lower-cased `value` if it looks like an email, recording an issue otherwise.
    pub fn email(&mut self, path: &str, value: String) -> Option<String> {
        if is_email(&value) {
            Some(value.to_lowercase())
        } else {
            self.fail(path, "Invalid email address");
            None
        }
    }

    /// Phone number with spaces, dashes, dots and parentheses removed.
    pub fn phone(&mut self, path: &str, value: String) -> Option<String> {
        let compact: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if is_phone(&compact) {
            Some(compact)
        } else {
            self.fail(path, "Invalid phone number");
            None
        }
    }

    /// Absolute `http` or `https` URL.
    pub fn url(&mut self, path: &str, value: String) -> Option<Url> {
        match Url::parse(&value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
            _ => {
                self.fail(path, format!("{} must be a valid URL", label(path)));
                None
            }
        }
    }

    /// Member of a closed set parsed with `FromStr`.
    pub fn one_of<T: std::str::FromStr>(
        &mut self,
        path: &str,
        value: String,
        expected: &[&str],
    ) -> Option<T> {
        if let Ok(parsed) = value.parse::<T>() {
            Some(parsed)
        } else {
            self.fail(
                path,
                format!("{} must be one of: {}", label(path), expected.join(", ")),
            );
            None
        }
    }

    /// Issues collected so far.
    pub fn issues(&self) -> &Issues {
        &self.issues
    }

    /// Build the validated entity, or return every recorded issue.
    ///
    /// `build` may use `?` on the `Option`s returned by the checks; it is only
    /// called when no issue was recorded.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Issues> {
        if !self.issues.is_empty() {
            return Err(self.issues);
        }
        build().ok_or_else(|| Issues::root("form is incomplete"))
    }
}

/// Human label for a wire field name: `motivation_letter` and
/// `motivationLetter` both become `Motivation letter`.
fn label(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 4);
    for (index, ch) in path.chars().enumerate() {
        if ch == '_' {
            out.push(' ');
        } else if ch.is_uppercase() && index > 0 {
            out.push(' ');
            out.extend(ch.to_lowercase());
        } else if index == 0 {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}
