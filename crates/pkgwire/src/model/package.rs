//! Assembled packages and their non-rule targets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::model::{DistributionType, Label, License, Location, Rule};

pub const PUBLIC_VISIBILITY: &str = "//visibility:public";
pub const PRIVATE_VISIBILITY: &str = "//visibility:private";

/// Who may depend on a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RuleVisibility {
    Public,
    #[default]
    Private,
    /// Visible to the listed package groups.
    PackageGroups(Vec<Label>),
}

impl RuleVisibility {
    /// Interprets a visibility label list.
    ///
    /// A list that is exactly `//visibility:public` or
    /// `//visibility:private` maps to the corresponding constant.
    pub fn from_labels(labels: Vec<Label>) -> Self {
        if let [only] = labels.as_slice() {
            match only.to_string().as_str() {
                PUBLIC_VISIBILITY => return RuleVisibility::Public,
                PRIVATE_VISIBILITY => return RuleVisibility::Private,
                _ => {}
            }
        }
        RuleVisibility::PackageGroups(labels)
    }

    /// The label list this visibility was declared with.
    pub fn labels(&self) -> Vec<Label> {
        match self {
            RuleVisibility::Public => Label::parse(PUBLIC_VISIBILITY).into_iter().collect(),
            RuleVisibility::Private => Label::parse(PRIVATE_VISIBILITY).into_iter().collect(),
            RuleVisibility::PackageGroups(labels) => labels.clone(),
        }
    }
}

/// A source file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub label: Label,
    pub location: Location,
    /// Explicit visibility, if the file declared one.
    pub visibility: Option<RuleVisibility>,
    /// Explicit license, if the file declared one.
    pub license: Option<License>,
}

impl InputFile {
    pub fn name(&self) -> &str {
        self.label.name()
    }
}

/// A named set of packages usable in visibility declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    pub label: Label,
    /// Package specifications, each stored with a leading `//`.
    pub package_specs: Vec<String>,
    pub includes: Vec<Label>,
    pub location: Location,
}

impl PackageGroup {
    pub fn name(&self) -> &str {
        self.label.name()
    }

    /// Whether `package` is named directly by one of the specifications.
    ///
    /// `//foo/...` matches `foo` and everything below it. Included groups
    /// are not followed.
    pub fn contains_package(&self, package: &str) -> bool {
        self.package_specs.iter().any(|spec| {
            let spec = spec.strip_prefix("//").unwrap_or(spec);
            match spec.strip_suffix("/...") {
                Some(prefix) => {
                    package == prefix
                        || package
                            .strip_prefix(prefix)
                            .is_some_and(|rest| rest.starts_with('/'))
                }
                None if spec == "..." => true,
                None => spec == package,
            }
        })
    }
}

/// A file pulled in through `subinclude()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subinclude {
    pub label: Label,
    pub path: PathBuf,
}

/// One value of a make variable, restricted to matching platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeBinding {
    pub value: String,
    pub platform_set_regexp: String,
}

/// Make variables of a package, in first-definition order.
///
/// Each (variable, platform regexp) pair holds one value; a later update
/// of the same pair replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakeEnvironment {
    variables: Vec<(String, Vec<MakeBinding>)>,
}

impl MakeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, variable: &str, value: &str, platform_set_regexp: &str) {
        let index = match self.variables.iter().position(|(name, _)| name == variable) {
            Some(index) => index,
            None => {
                self.variables.push((variable.to_string(), Vec::new()));
                self.variables.len() - 1
            }
        };
        let bindings = &mut self.variables[index].1;
        match bindings
            .iter_mut()
            .find(|b| b.platform_set_regexp == platform_set_regexp)
        {
            Some(binding) => binding.value = value.to_string(),
            None => bindings.push(MakeBinding {
                value: value.to_string(),
                platform_set_regexp: platform_set_regexp.to_string(),
            }),
        }
    }

    /// Bindings of one variable.
    pub fn bindings(&self, variable: &str) -> &[MakeBinding] {
        self.variables
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, b)| b.as_slice())
            .unwrap_or(&[])
    }

    /// The value bound for an exact platform regexp.
    pub fn get(&self, variable: &str, platform_set_regexp: &str) -> Option<&str> {
        self.bindings(variable)
            .iter()
            .find(|b| b.platform_set_regexp == platform_set_regexp)
            .map(|b| b.value.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// A fully assembled package.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub(crate) name: String,
    pub(crate) build_file: PathBuf,
    pub(crate) default_visibility: RuleVisibility,
    pub(crate) default_visibility_set: bool,
    pub(crate) default_obsolete: bool,
    pub(crate) default_testonly: bool,
    pub(crate) default_deprecation: Option<String>,
    pub(crate) default_license: License,
    pub(crate) default_distribs: BTreeSet<DistributionType>,
    pub(crate) subincludes: Vec<Subinclude>,
    pub(crate) make_env: MakeEnvironment,
    pub(crate) input_files: Vec<InputFile>,
    pub(crate) package_groups: Vec<PackageGroup>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) output_files: Vec<Label>,
    pub(crate) contains_errors: bool,
}

impl Package {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_file(&self) -> &Path {
        &self.build_file
    }

    /// Directory containing the build file.
    pub fn package_directory(&self) -> &Path {
        self.build_file.parent().unwrap_or(Path::new(""))
    }

    pub fn default_visibility(&self) -> &RuleVisibility {
        &self.default_visibility
    }

    /// Whether the build file declared a default visibility.
    pub fn default_visibility_set(&self) -> bool {
        self.default_visibility_set
    }

    pub fn default_obsolete(&self) -> bool {
        self.default_obsolete
    }

    pub fn default_testonly(&self) -> bool {
        self.default_testonly
    }

    pub fn default_deprecation(&self) -> Option<&str> {
        self.default_deprecation.as_deref()
    }

    pub fn default_license(&self) -> &License {
        &self.default_license
    }

    pub fn default_distribs(&self) -> &BTreeSet<DistributionType> {
        &self.default_distribs
    }

    pub fn subincludes(&self) -> &[Subinclude] {
        &self.subincludes
    }

    pub fn make_env(&self) -> &MakeEnvironment {
        &self.make_env
    }

    pub fn input_files(&self) -> &[InputFile] {
        &self.input_files
    }

    pub fn package_groups(&self) -> &[PackageGroup] {
        &self.package_groups
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Files generated by the package's rules.
    pub fn output_files(&self) -> &[Label] {
        &self.output_files
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn input_file(&self, name: &str) -> Option<&InputFile> {
        self.input_files.iter().find(|f| f.name() == name)
    }

    pub fn package_group(&self, name: &str) -> Option<&PackageGroup> {
        self.package_groups.iter().find(|g| g.name() == name)
    }

    /// Whether rule construction reported structural errors.
    pub fn contains_errors(&self) -> bool {
        self.contains_errors
    }
}
