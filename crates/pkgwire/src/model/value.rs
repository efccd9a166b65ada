//! Attribute values of rules.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

use crate::model::{DistributionType, Label, License, Location};

/// Declared type of an attribute in a rule-class schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Integer,
    String,
    Label,
    /// A label that is not a dependency edge; travels as a plain string.
    NodepLabel,
    Output,
    StringList,
    LabelList,
    /// A label list that is not a dependency edge; travels as a string list.
    NodepLabelList,
    OutputList,
    DistributionSet,
    License,
    StringDict,
    FilesetEntryList,
    LabelListDict,
    StringListDict,
    Boolean,
    Tristate,
}

impl AttributeType {
    /// Whether values of this type name output files of the rule.
    pub fn is_output(&self) -> bool {
        matches!(self, AttributeType::Output | AttributeType::OutputList)
    }

    /// Parses the schema name of a type (e.g. "label_list").
    pub fn from_name(name: &str) -> Option<AttributeType> {
        match name {
            "int" | "integer" => Some(AttributeType::Integer),
            "string" => Some(AttributeType::String),
            "label" => Some(AttributeType::Label),
            "nodep_label" => Some(AttributeType::NodepLabel),
            "output" => Some(AttributeType::Output),
            "string_list" => Some(AttributeType::StringList),
            "label_list" => Some(AttributeType::LabelList),
            "nodep_label_list" => Some(AttributeType::NodepLabelList),
            "output_list" => Some(AttributeType::OutputList),
            "distribution_set" => Some(AttributeType::DistributionSet),
            "license" => Some(AttributeType::License),
            "string_dict" => Some(AttributeType::StringDict),
            "fileset_entry_list" => Some(AttributeType::FilesetEntryList),
            "label_list_dict" => Some(AttributeType::LabelListDict),
            "string_list_dict" => Some(AttributeType::StringListDict),
            "boolean" | "bool" => Some(AttributeType::Boolean),
            "tristate" => Some(AttributeType::Tristate),
            _ => None,
        }
    }
}

/// Three-valued flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    Yes,
    No,
    Auto,
}

impl TriState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriState::Yes => "yes",
            TriState::No => "no",
            TriState::Auto => "auto",
        }
    }
}

/// How a fileset treats symlinks in its sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SymlinkBehavior {
    #[default]
    Copy,
    Dereference,
}

/// Where one element of a list attribute came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlobCriteria {
    /// A literal list, kept verbatim.
    Explicit { include: Vec<String> },
    /// A `glob(include, exclude)` call.
    Glob {
        include: Vec<String>,
        exclude: Vec<String>,
    },
}

impl GlobCriteria {
    pub fn is_glob(&self) -> bool {
        matches!(self, GlobCriteria::Glob { .. })
    }

    pub fn include(&self) -> &[String] {
        match self {
            GlobCriteria::Explicit { include } | GlobCriteria::Glob { include, .. } => include,
        }
    }

    pub fn exclude(&self) -> &[String] {
        match self {
            GlobCriteria::Explicit { .. } => &[],
            GlobCriteria::Glob { exclude, .. } => exclude,
        }
    }
}

impl fmt::Display for GlobCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobCriteria::Explicit { include } => write!(f, "{include:?}"),
            GlobCriteria::Glob { include, exclude } if exclude.is_empty() => {
                write!(f, "glob({include:?})")
            }
            GlobCriteria::Glob { include, exclude } => {
                write!(f, "glob({include:?}, exclude={exclude:?})")
            }
        }
    }
}

/// A list attribute value with optional glob provenance.
///
/// Provenance is audit metadata only: equality compares the items alone.
#[derive(Debug, Clone)]
pub struct GlobList<T> {
    items: Vec<T>,
    criteria: Option<Vec<GlobCriteria>>,
}

impl<T> GlobList<T> {
    /// A plain list with no provenance.
    pub fn plain(items: Vec<T>) -> Self {
        Self {
            items,
            criteria: None,
        }
    }

    /// A list together with the criteria that produced it.
    pub fn with_criteria(items: Vec<T>, criteria: Vec<GlobCriteria>) -> Self {
        Self {
            items,
            criteria: Some(criteria),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The recorded provenance, if any.
    pub fn criteria(&self) -> Option<&[GlobCriteria]> {
        self.criteria.as_deref()
    }

    /// True if any criterion is a `glob()` call.
    pub fn has_glob(&self) -> bool {
        self.criteria
            .as_ref()
            .is_some_and(|c| c.iter().any(GlobCriteria::is_glob))
    }
}

impl<T> Deref for GlobList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> PartialEq for GlobList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for GlobList<T> {}

impl<T> From<Vec<T>> for GlobList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::plain(items)
    }
}

/// How to materialize a set of files into a fileset's output tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilesetEntry {
    pub src: Label,
    /// `None` means the file list is derived at evaluation time.
    pub files: Option<Vec<Label>>,
    /// `None` means no excludes were given, as opposed to an empty list.
    pub excludes: Option<Vec<String>>,
    pub dest_dir: String,
    pub symlink_behavior: SymlinkBehavior,
    pub strip_prefix: Option<String>,
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Integer(i32),
    String(String),
    Label(Label),
    StringList(GlobList<String>),
    LabelList(GlobList<Label>),
    DistributionSet(BTreeSet<DistributionType>),
    License(License),
    /// Key/value pairs in wire order; duplicates are kept.
    StringDict(Vec<(String, String)>),
    FilesetEntryList(Vec<FilesetEntry>),
    LabelListDict(Vec<(String, Vec<Label>)>),
    StringListDict(Vec<(String, Vec<String>)>),
    Boolean(bool),
    TriState(TriState),
}

impl AttributeValue {
    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Integer(_) => "integer",
            AttributeValue::String(_) => "string",
            AttributeValue::Label(_) => "label",
            AttributeValue::StringList(_) => "string_list",
            AttributeValue::LabelList(_) => "label_list",
            AttributeValue::DistributionSet(_) => "distribution_set",
            AttributeValue::License(_) => "license",
            AttributeValue::StringDict(_) => "string_dict",
            AttributeValue::FilesetEntryList(_) => "fileset_entry_list",
            AttributeValue::LabelListDict(_) => "label_list_dict",
            AttributeValue::StringListDict(_) => "string_list_dict",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::TriState(_) => "tristate",
        }
    }

    /// Every label carried by this value, in order.
    pub fn labels(&self) -> Vec<&Label> {
        match self {
            AttributeValue::Label(l) => vec![l],
            AttributeValue::LabelList(list) => list.iter().collect(),
            AttributeValue::LabelListDict(entries) => {
                entries.iter().flat_map(|(_, v)| v.iter()).collect()
            }
            AttributeValue::FilesetEntryList(entries) => entries
                .iter()
                .flat_map(|e| std::iter::once(&e.src).chain(e.files.iter().flatten()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A decoded attribute together with its parse metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAttribute {
    pub value: AttributeValue,
    /// Whether the build file set this attribute explicitly.
    pub explicitly_specified: bool,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_list_equality_ignores_provenance() {
        let plain = GlobList::plain(vec!["a.cc".to_string()]);
        let globbed = GlobList::with_criteria(
            vec!["a.cc".to_string()],
            vec![GlobCriteria::Glob {
                include: vec!["*.cc".to_string()],
                exclude: vec![],
            }],
        );
        assert_eq!(plain, globbed);
        assert!(plain.criteria().is_none());
        assert!(globbed.has_glob());
        assert_eq!(globbed.len(), 1);
    }

    #[test]
    fn test_criteria_display() {
        let c = GlobCriteria::Glob {
            include: vec!["*.h".to_string()],
            exclude: vec!["x.h".to_string()],
        };
        assert_eq!(c.to_string(), r#"glob(["*.h"], exclude=["x.h"])"#);
        assert_eq!(c.exclude(), ["x.h".to_string()]);

        let e = GlobCriteria::Explicit {
            include: vec!["a".to_string()],
        };
        assert!(e.exclude().is_empty());
        assert_eq!(e.to_string(), r#"["a"]"#);
    }

    #[test]
    fn test_attribute_type_names() {
        assert_eq!(AttributeType::from_name("output_list"), Some(AttributeType::OutputList));
        assert_eq!(AttributeType::from_name("bogus"), None);
        assert!(AttributeType::Output.is_output());
        assert!(!AttributeType::Label.is_output());
    }

    #[test]
    fn test_tristate_as_str() {
        assert_eq!(TriState::Yes.as_str(), "yes");
        assert_eq!(TriState::No.as_str(), "no");
        assert_eq!(TriState::Auto.as_str(), "auto");
    }

    #[test]
    fn test_labels_collects_fileset_sources() {
        let src = Label::parse("//pkg:src").unwrap();
        let file = Label::parse("//pkg:f").unwrap();
        let value = AttributeValue::FilesetEntryList(vec![FilesetEntry {
            src: src.clone(),
            files: Some(vec![file.clone()]),
            excludes: None,
            dest_dir: String::new(),
            symlink_behavior: SymlinkBehavior::Copy,
            strip_prefix: None,
        }]);
        assert_eq!(value.labels(), vec![&src, &file]);
    }
}
