//! Package assembly from a decoded wire message.
//!
//! Assembly runs a fixed sequence of steps against a builder. Applying the
//! default visibility marks it as set, so the wire's own "default
//! visibility set" flag is written back afterwards; the package's flag
//! always equals the wire flag, with absence meaning false.
//!
//! Any error aborts the package. The builder and the events gathered so
//! far are dropped with it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use prost::Message;

use crate::codec::location::reconstruct;
use crate::codec::scalar::{decode_distribs, decode_license};
use crate::codec::value::decode_attribute;
use crate::deserializer::{BuildFileResolver, DecodedPackage};
use crate::error::DecodeError;
use crate::event::{Event, EventCollector, EventHandler, EventKind};
use crate::limits::MAX_PACKAGE_MESSAGE_SIZE;
use crate::model::{
    BulkPackageLocator, InputFile, Label, LegacyPackage, LegacyPackageBuilder, MakeEnvironment,
    Package, PackageBuilder, PackageGroup, RuleClassRegistry, RuleVisibility, parse_labels,
};
use crate::wire;

/// Decodes raw bytes into a wire package message.
pub fn decode_package_message(bytes: &[u8]) -> Result<wire::Package, DecodeError> {
    if bytes.len() > MAX_PACKAGE_MESSAGE_SIZE {
        return Err(DecodeError::MessageTooLarge {
            len: bytes.len(),
            max: MAX_PACKAGE_MESSAGE_SIZE,
        });
    }
    Ok(wire::Package::decode(bytes)?)
}

/// Assembles a package through the current builder.
pub fn deserialize_package(
    registry: &dyn RuleClassRegistry,
    resolver: &dyn BuildFileResolver,
    message: &wire::Package,
) -> Result<DecodedPackage<Package>, DecodeError> {
    let mut builder = PackageBuilder::new(message.name.as_str());
    let mut events = EventCollector::new();
    Context::new(registry, resolver, message)?.assemble(message, &mut builder, &mut events)?;

    let package = builder.build();
    log_finished(&package);
    Ok(DecodedPackage { package, events })
}

/// Assembles a package through the legacy builder.
///
/// Finalization additionally checks file targets against `locator`.
pub fn deserialize_legacy_package(
    registry: &dyn RuleClassRegistry,
    resolver: &dyn BuildFileResolver,
    locator: &dyn BulkPackageLocator,
    message: &wire::Package,
) -> Result<DecodedPackage<LegacyPackage>, DecodeError> {
    let mut builder = LegacyPackageBuilder::new(message.name.as_str());
    let mut events = EventCollector::new();
    Context::new(registry, resolver, message)?.assemble(message, &mut builder, &mut events)?;

    let package = builder.build(locator, &mut events)?;
    log_finished(package.package());
    Ok(DecodedPackage { package, events })
}

fn log_finished(package: &Package) {
    tracing::debug!(
        package = %package.name(),
        rules = package.rules().len(),
        input_files = package.input_files().len(),
        package_groups = package.package_groups().len(),
        contains_errors = package.contains_errors(),
        "package decoded"
    );
}

/// State of one package decode. Never reused across packages.
struct Context<'a> {
    build_file: PathBuf,
    registry: &'a dyn RuleClassRegistry,
    resolver: &'a dyn BuildFileResolver,
}

impl<'a> Context<'a> {
    fn new(
        registry: &'a dyn RuleClassRegistry,
        resolver: &'a dyn BuildFileResolver,
        message: &wire::Package,
    ) -> Result<Self, DecodeError> {
        let build_file =
            resolver
                .build_file(&message.name)
                .ok_or_else(|| DecodeError::BuildFileNotFound {
                    package: message.name.clone(),
                })?;
        Ok(Self {
            build_file,
            registry,
            resolver,
        })
    }

    fn assemble<B: AsMut<PackageBuilder>>(
        &self,
        message: &wire::Package,
        builder: &mut B,
        events: &mut EventCollector,
    ) -> Result<(), DecodeError> {
        let builder = builder.as_mut();
        tracing::debug!(
            package = %message.name,
            build_file = %self.build_file.display(),
            rules = message.rule.len(),
            "decoding package"
        );

        builder.set_build_file(self.build_file.clone());
        self.apply_defaults(message, builder)?;
        self.add_subincludes(message, builder)?;
        builder.set_make_env(fold_make_env(&message.make_variable));

        for file in &message.source_file {
            self.add_input_file(file, builder)?;
        }
        for group in &message.package_group {
            self.add_package_group(group, builder)?;
        }
        for rule in &message.rule {
            self.add_rule(rule, builder)?;
        }

        self.replay_events(&message.event, events);

        if message.contains_errors.unwrap_or(false) {
            builder.set_contains_errors();
        }
        Ok(())
    }

    fn apply_defaults(
        &self,
        message: &wire::Package,
        builder: &mut PackageBuilder,
    ) -> Result<(), DecodeError> {
        if message.default_visibility_set == Some(true) {
            let labels = parse_labels(&message.default_visibility_label)?;
            builder.set_default_visibility(RuleVisibility::from_labels(labels));
        }
        // Must follow the visibility above, which marks the flag as set.
        builder.set_default_visibility_set(message.default_visibility_set.unwrap_or(false));

        if let Some(obsolete) = message.default_obsolete {
            builder.set_default_obsolete(obsolete);
        }
        if let Some(testonly) = message.default_testonly {
            builder.set_default_testonly(testonly);
        }
        if let Some(deprecation) = &message.default_deprecation {
            builder.set_default_deprecation(deprecation.as_str());
        }

        if let Some(license) = &message.default_license {
            builder.set_default_license(decode_license(license)?);
        }
        builder.set_default_distribs(decode_distribs(&message.default_distrib)?);
        Ok(())
    }

    fn add_subincludes(
        &self,
        message: &wire::Package,
        builder: &mut PackageBuilder,
    ) -> Result<(), DecodeError> {
        for text in &message.subinclude_label {
            let label = Label::parse(text)?;
            let build_file = self
                .resolver
                .build_file(label.package_name())
                .ok_or_else(|| DecodeError::UnresolvedSubinclude {
                    label: label.to_string(),
                    package: label.package_name().to_string(),
                })?;
            let path = build_file
                .parent()
                .unwrap_or(Path::new(""))
                .join(label.name());
            builder.add_subinclude(label, path);
        }
        Ok(())
    }

    fn add_input_file(
        &self,
        file: &wire::SourceFile,
        builder: &mut PackageBuilder,
    ) -> Result<(), DecodeError> {
        let label = own_label(builder, &file.name)?;
        // Visibility and license are declared together; either one makes both
        // explicit.
        let (visibility, license) =
            if file.visibility_label.is_empty() && file.license.is_none() {
                (None, None)
            } else {
                let labels = parse_labels(&file.visibility_label)?;
                let license = file.license.clone().unwrap_or_default();
                (
                    Some(RuleVisibility::from_labels(labels)),
                    Some(decode_license(&license)?),
                )
            };

        builder.add_input_file(InputFile {
            label,
            location: self.location(file.parseable_location.as_ref()),
            visibility,
            license,
        })
    }

    fn add_package_group(
        &self,
        group: &wire::PackageGroup,
        builder: &mut PackageBuilder,
    ) -> Result<(), DecodeError> {
        let label = own_label(builder, &group.name)?;
        let package_specs = group
            .contained_package
            .iter()
            .map(|spec| format!("//{spec}"))
            .collect();

        builder.add_package_group(PackageGroup {
            label,
            package_specs,
            includes: parse_labels(&group.included_package_group)?,
            location: self.location(group.parseable_location.as_ref()),
        })
    }

    fn add_rule(&self, rule: &wire::Rule, builder: &mut PackageBuilder) -> Result<(), DecodeError> {
        let class = self.registry.rule_class(&rule.rule_class).ok_or_else(|| {
            DecodeError::UnknownRuleClass {
                rule_class: rule.rule_class.clone(),
            }
        })?;
        let label = Label::parse(&rule.name)?;

        let mut attributes = BTreeMap::new();
        for attr in &rule.attribute {
            let declared =
                class
                    .attribute_type(&attr.name)
                    .ok_or_else(|| DecodeError::UnknownAttribute {
                        rule_class: class.name().to_string(),
                        attribute: attr.name.clone(),
                    })?;
            let parsed = decode_attribute(declared, &self.build_file, attr)?;
            attributes.insert(attr.name.clone(), parsed);
        }

        tracing::trace!(
            rule = %label,
            rule_class = %class.name(),
            attributes = attributes.len(),
            "decoded rule"
        );

        let location = self.location(rule.parseable_location.as_ref());
        builder.add_rule(class.create_rule(label, location, attributes)?)
    }

    fn replay_events(&self, wire_events: &[wire::Event], events: &mut EventCollector) {
        for event in wire_events {
            let kind = match wire::EventKind::try_from(event.kind) {
                Ok(wire::EventKind::Error) => EventKind::Error,
                Ok(wire::EventKind::Warning) => EventKind::Warning,
                Ok(wire::EventKind::Info) => EventKind::Info,
                Ok(wire::EventKind::Progress) => EventKind::Progress,
                Err(_) => {
                    tracing::trace!(kind = event.kind, "dropping event of unknown kind");
                    continue;
                }
            };
            events.handle(Event {
                kind,
                location: event
                    .location
                    .as_ref()
                    .map(|l| reconstruct(&self.build_file, Some(l))),
                message: event.message.clone(),
            });
        }
    }

    fn location(&self, location: Option<&wire::Location>) -> crate::model::Location {
        reconstruct(&self.build_file, location)
    }
}

/// Folds make variable bindings; the last write per (variable, platform)
/// wins.
fn fold_make_env(variables: &[wire::MakeVar]) -> MakeEnvironment {
    let mut env = MakeEnvironment::new();
    for variable in variables {
        for binding in &variable.binding {
            env.update(&variable.name, &binding.value, &binding.platform_set_regexp);
        }
    }
    env
}

/// Parses a target label and rehomes its name into the package under
/// construction.
fn own_label(builder: &PackageBuilder, text: &str) -> Result<Label, DecodeError> {
    let label = Label::parse(text)?;
    Ok(Label::new(builder.name(), label.name())?)
}
