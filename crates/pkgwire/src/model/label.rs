//! Absolute target labels.
//!
//! A label names a target as `//package/path:target`. Only the absolute
//! form is accepted; every label on the wire was written out fully
//! qualified by the serializer.

use std::fmt;

use crate::error::LabelError;

/// A validated absolute label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    package: String,
    name: String,
}

impl Label {
    /// Parses an absolute label.
    ///
    /// `//foo/bar` is shorthand for `//foo/bar:bar`; `//:name` names a
    /// target in the root package.
    pub fn parse(text: &str) -> Result<Label, LabelError> {
        let rest = text
            .strip_prefix("//")
            .ok_or_else(|| LabelError::new(text, "must start with '//'"))?;

        let (package, name) = match rest.split_once(':') {
            Some((package, name)) => (package, name),
            None => {
                let name = rest.rsplit('/').next().unwrap_or(rest);
                if name.is_empty() {
                    return Err(LabelError::new(text, "empty target name"));
                }
                (rest, name)
            }
        };

        validate_package_name(package).map_err(|reason| LabelError::new(text, reason))?;
        validate_target_name(name).map_err(|reason| LabelError::new(text, reason))?;

        Ok(Label {
            package: package.to_string(),
            name: name.to_string(),
        })
    }

    /// Builds a label from an already-validated package and a target name.
    pub fn new(package: &str, name: &str) -> Result<Label, LabelError> {
        let text = format!("//{package}:{name}");
        validate_package_name(package).map_err(|reason| LabelError::new(&text, reason))?;
        validate_target_name(name).map_err(|reason| LabelError::new(&text, reason))?;
        Ok(Label {
            package: package.to_string(),
            name: name.to_string(),
        })
    }

    /// The package path, without the leading `//`.
    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// The target name within the package.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.package, self.name)
    }
}

/// Parses a single absolute label.
pub fn parse_label(text: &str) -> Result<Label, LabelError> {
    Label::parse(text)
}

/// Parses a list of labels, preserving order and failing on the first
/// invalid entry.
pub fn parse_labels<S: AsRef<str>>(texts: &[S]) -> Result<Vec<Label>, LabelError> {
    texts.iter().map(|t| Label::parse(t.as_ref())).collect()
}

fn validate_package_name(package: &str) -> Result<(), &'static str> {
    if package.is_empty() {
        return Ok(());
    }
    if package.starts_with('/') {
        return Err("package name may not start with '/'");
    }
    if package.ends_with('/') {
        return Err("package name may not end with '/'");
    }
    for segment in package.split('/') {
        match segment {
            "" => return Err("package name may not contain '//'"),
            "." | ".." => return Err("package name may not contain '.' or '..' segments"),
            _ => {}
        }
    }
    if !package.chars().all(is_package_char) {
        return Err("package name contains an invalid character");
    }
    Ok(())
}

fn validate_target_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty target name");
    }
    if name.starts_with('/') {
        return Err("target name may not start with '/'");
    }
    if name.ends_with('/') {
        return Err("target name may not end with '/'");
    }
    for segment in name.split('/') {
        match segment {
            "" => return Err("target name may not contain '//'"),
            "." | ".." => return Err("target name may not contain '.' or '..' segments"),
            _ => {}
        }
    }
    if !name.chars().all(is_target_char) {
        return Err("target name contains an invalid character");
    }
    Ok(())
}

fn is_package_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '.' | '_' | '@' | '+' | '=' | ',' | '~')
}

fn is_target_char(c: char) -> bool {
    c.is_ascii_graphic() && c != ':'
}
