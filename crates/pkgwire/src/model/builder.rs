//! Package builders.
//!
//! A builder accumulates the targets and defaults of one package and owns
//! its name table; every target name is registered exactly once. Two
//! finalizations exist:
//!
//! - [`PackageBuilder::build`] yields a [`Package`].
//! - [`LegacyPackageBuilder::build`] additionally consults a
//!   [`BulkPackageLocator`] to flag targets whose names reach into a
//!   subpackage, and yields a [`LegacyPackage`].
//!
//! # Example
//!
//! ```rust
//! use pkgwire::model::{Label, Location, PackageBuilder, InputFile};
//!
//! let mut builder = PackageBuilder::new("pkg");
//! builder.set_build_file("ws/pkg/BUILD");
//! builder
//!     .add_input_file(InputFile {
//!         label: Label::parse("//pkg:a.txt").unwrap(),
//!         location: Location::for_file("ws/pkg/BUILD"),
//!         visibility: None,
//!         license: None,
//!     })
//!     .unwrap();
//! let package = builder.build();
//! assert_eq!(package.input_files().len(), 1);
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::error::{DecodeError, Interrupted};
use crate::event::{EventCollector, EventHandler};
use crate::model::{
    DistributionType, InputFile, Label, License, Location, MakeEnvironment, Package, PackageGroup,
    Rule, RuleVisibility, Subinclude,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    InputFile,
    PackageGroup,
    Rule,
    OutputFile,
}

impl TargetKind {
    fn as_str(self) -> &'static str {
        match self {
            TargetKind::InputFile => "input file",
            TargetKind::PackageGroup => "package group",
            TargetKind::Rule => "rule",
            TargetKind::OutputFile => "output file",
        }
    }
}

/// Builder for a [`Package`].
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    name: String,
    build_file: PathBuf,
    default_visibility: RuleVisibility,
    default_visibility_set: bool,
    default_obsolete: bool,
    default_testonly: bool,
    default_deprecation: Option<String>,
    default_license: License,
    default_distribs: BTreeSet<DistributionType>,
    subincludes: Vec<Subinclude>,
    make_env: MakeEnvironment,
    input_files: Vec<InputFile>,
    package_groups: Vec<PackageGroup>,
    rules: Vec<Rule>,
    output_files: Vec<(Label, Location)>,
    names: FxHashMap<String, TargetKind>,
    contains_errors: bool,
}

impl PackageBuilder {
    /// Creates an empty builder for the named package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build_file: PathBuf::new(),
            default_visibility: RuleVisibility::default(),
            default_visibility_set: false,
            default_obsolete: false,
            default_testonly: false,
            default_deprecation: None,
            default_license: License::no_license(),
            default_distribs: BTreeSet::new(),
            subincludes: Vec::new(),
            make_env: MakeEnvironment::new(),
            input_files: Vec::new(),
            package_groups: Vec::new(),
            rules: Vec::new(),
            output_files: Vec::new(),
            names: FxHashMap::default(),
            contains_errors: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_build_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.build_file = path.into();
        self
    }

    /// Sets the default visibility. Also marks it as set.
    pub fn set_default_visibility(&mut self, visibility: RuleVisibility) -> &mut Self {
        self.default_visibility = visibility;
        self.default_visibility_set = true;
        self
    }

    pub fn set_default_visibility_set(&mut self, set: bool) -> &mut Self {
        self.default_visibility_set = set;
        self
    }

    pub fn default_visibility_set(&self) -> bool {
        self.default_visibility_set
    }

    pub fn set_default_obsolete(&mut self, obsolete: bool) -> &mut Self {
        self.default_obsolete = obsolete;
        self
    }

    pub fn set_default_testonly(&mut self, testonly: bool) -> &mut Self {
        self.default_testonly = testonly;
        self
    }

    pub fn set_default_deprecation(&mut self, deprecation: impl Into<String>) -> &mut Self {
        self.default_deprecation = Some(deprecation.into());
        self
    }

    pub fn set_default_license(&mut self, license: License) -> &mut Self {
        self.default_license = license;
        self
    }

    pub fn set_default_distribs(&mut self, distribs: BTreeSet<DistributionType>) -> &mut Self {
        self.default_distribs = distribs;
        self
    }

    pub fn add_subinclude(&mut self, label: Label, path: impl Into<PathBuf>) -> &mut Self {
        self.subincludes.push(Subinclude {
            label,
            path: path.into(),
        });
        self
    }

    pub fn set_make_env(&mut self, make_env: MakeEnvironment) -> &mut Self {
        self.make_env = make_env;
        self
    }

    pub fn set_contains_errors(&mut self) -> &mut Self {
        self.contains_errors = true;
        self
    }

    /// Whether `name` is already taken by a target.
    pub fn contains_target(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn add_input_file(&mut self, file: InputFile) -> Result<(), DecodeError> {
        self.check_owned(&file.label)?;
        self.check_free(file.name(), TargetKind::InputFile)?;
        self.names
            .insert(file.name().to_string(), TargetKind::InputFile);
        self.input_files.push(file);
        Ok(())
    }

    pub fn add_package_group(&mut self, group: PackageGroup) -> Result<(), DecodeError> {
        self.check_owned(&group.label)?;
        self.check_free(group.name(), TargetKind::PackageGroup)?;
        self.names
            .insert(group.name().to_string(), TargetKind::PackageGroup);
        self.package_groups.push(group);
        Ok(())
    }

    /// Adds a rule and registers its output files.
    ///
    /// Either the rule and all its outputs are registered, or nothing is.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), DecodeError> {
        self.check_owned(rule.label())?;
        self.check_free(rule.name(), TargetKind::Rule)?;

        let mut seen = BTreeSet::new();
        for output in rule.outputs() {
            self.check_owned(output)?;
            if output.name() == rule.name() || !seen.insert(output.name()) {
                return Err(self.conflict(output.name(), TargetKind::OutputFile));
            }
            self.check_free(output.name(), TargetKind::OutputFile)?;
        }

        self.names
            .insert(rule.name().to_string(), TargetKind::Rule);
        for output in rule.outputs() {
            self.names
                .insert(output.name().to_string(), TargetKind::OutputFile);
            self.output_files
                .push((output.clone(), rule.location().clone()));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Returns the number of targets registered so far.
    pub fn target_count(&self) -> usize {
        self.names.len()
    }

    /// Finishes the package.
    pub fn build(self) -> Package {
        Package {
            name: self.name,
            build_file: self.build_file,
            default_visibility: self.default_visibility,
            default_visibility_set: self.default_visibility_set,
            default_obsolete: self.default_obsolete,
            default_testonly: self.default_testonly,
            default_deprecation: self.default_deprecation,
            default_license: self.default_license,
            default_distribs: self.default_distribs,
            subincludes: self.subincludes,
            make_env: self.make_env,
            input_files: self.input_files,
            package_groups: self.package_groups,
            rules: self.rules,
            output_files: self.output_files.into_iter().map(|(l, _)| l).collect(),
            contains_errors: self.contains_errors,
        }
    }

    fn check_owned(&self, label: &Label) -> Result<(), DecodeError> {
        if label.package_name() != self.name {
            return Err(DecodeError::RuleOutsidePackage {
                package: self.name.clone(),
                label: label.to_string(),
            });
        }
        Ok(())
    }

    fn check_free(&self, name: &str, kind: TargetKind) -> Result<(), DecodeError> {
        if self.names.contains_key(name) {
            return Err(self.conflict(name, kind));
        }
        Ok(())
    }

    fn conflict(&self, name: &str, kind: TargetKind) -> DecodeError {
        DecodeError::NameConflict {
            package: self.name.clone(),
            name: name.to_string(),
            kind: kind.as_str(),
        }
    }
}

impl AsMut<PackageBuilder> for PackageBuilder {
    fn as_mut(&mut self) -> &mut PackageBuilder {
        self
    }
}

/// Answers whether a path is the root of a package.
///
/// Calls may block (e.g. on file system access) and may be interrupted.
pub trait BulkPackageLocator {
    fn is_package(&self, package: &str) -> Result<bool, Interrupted>;
}

/// A locator that knows no packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPackageLocator;

pub const EMPTY_PACKAGE_LOCATOR: EmptyPackageLocator = EmptyPackageLocator;

impl BulkPackageLocator for EmptyPackageLocator {
    fn is_package(&self, _package: &str) -> Result<bool, Interrupted> {
        Ok(false)
    }
}

impl<F> BulkPackageLocator for F
where
    F: Fn(&str) -> Result<bool, Interrupted>,
{
    fn is_package(&self, package: &str) -> Result<bool, Interrupted> {
        self(package)
    }
}

/// A target whose name reaches into a subpackage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpackageCrossing {
    pub label: Label,
    pub subpackage: String,
}

/// A package assembled through the legacy path.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPackage {
    package: Package,
    crossings: Vec<SubpackageCrossing>,
}

impl LegacyPackage {
    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn into_package(self) -> Package {
        self.package
    }

    /// Targets found to cross into a subpackage during finalization.
    pub fn subpackage_crossings(&self) -> &[SubpackageCrossing] {
        &self.crossings
    }
}

/// Builder for a [`LegacyPackage`].
#[derive(Debug, Clone)]
pub struct LegacyPackageBuilder {
    inner: PackageBuilder,
}

impl LegacyPackageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: PackageBuilder::new(name),
        }
    }

    /// Finishes the package, checking file targets against `locator`.
    ///
    /// Each crossing is reported as an error event and marks the package
    /// as containing errors.
    pub fn build(
        mut self,
        locator: &dyn BulkPackageLocator,
        events: &mut EventCollector,
    ) -> Result<LegacyPackage, DecodeError> {
        let package_name = self.inner.name.clone();

        let mut candidates: Vec<(Label, Location)> = self
            .inner
            .input_files
            .iter()
            .map(|f| (f.label.clone(), f.location.clone()))
            .collect();
        candidates.extend(self.inner.output_files.iter().cloned());

        let mut crossings = Vec::new();
        for (label, location) in candidates {
            if let Some(subpackage) = find_subpackage(&package_name, label.name(), locator)? {
                events.error(
                    Some(location),
                    format!("label '{label}' crosses boundary of subpackage '{subpackage}'"),
                );
                crossings.push(SubpackageCrossing { label, subpackage });
            }
        }

        if !crossings.is_empty() {
            tracing::debug!(
                package = %package_name,
                crossings = crossings.len(),
                "targets cross subpackage boundaries"
            );
            self.inner.set_contains_errors();
        }

        Ok(LegacyPackage {
            package: self.inner.build(),
            crossings,
        })
    }
}

impl AsMut<PackageBuilder> for LegacyPackageBuilder {
    fn as_mut(&mut self) -> &mut PackageBuilder {
        &mut self.inner
    }
}

/// Returns the outermost directory prefix of `target` that is a package of
/// its own.
fn find_subpackage(
    package: &str,
    target: &str,
    locator: &dyn BulkPackageLocator,
) -> Result<Option<String>, DecodeError> {
    let mut dir = String::new();
    let mut segments: Vec<&str> = target.split('/').collect();
    segments.pop();
    for segment in segments {
        if !dir.is_empty() {
            dir.push('/');
        }
        dir.push_str(segment);
        let candidate = if package.is_empty() {
            dir.clone()
        } else {
            format!("{package}/{dir}")
        };
        let found = locator
            .is_package(&candidate)
            .map_err(|_| DecodeError::Interrupted {
                context: "locating subpackages",
            })?;
        if found {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
