//! Rules and rule-class schemas.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::DecodeError;
use crate::model::{AttributeType, AttributeValue, Label, Location, ParsedAttribute};

/// Schema of a rule class: attribute name to declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleClass {
    name: String,
    attributes: FxHashMap<String, AttributeType>,
}

impl RuleClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: FxHashMap::default(),
        }
    }

    /// Declares an attribute (builder style).
    pub fn attr(mut self, name: impl Into<String>, attr_type: AttributeType) -> Self {
        self.attributes.insert(name.into(), attr_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the named attribute.
    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        self.attributes.get(name).copied()
    }

    /// Builds a rule from decoded attribute values.
    ///
    /// Output-typed attributes become the rule's output files.
    pub fn create_rule(
        &self,
        label: Label,
        location: Location,
        attributes: BTreeMap<String, ParsedAttribute>,
    ) -> Result<Rule, DecodeError> {
        let mut outputs = Vec::new();
        for (name, attr) in &attributes {
            let attr_type =
                self.attribute_type(name)
                    .ok_or_else(|| DecodeError::UnknownAttribute {
                        rule_class: self.name.clone(),
                        attribute: name.clone(),
                    })?;
            if attr_type.is_output() {
                outputs.extend(attr.value.labels().into_iter().cloned());
            }
        }

        Ok(Rule {
            label,
            rule_class: self.name.clone(),
            location,
            attributes,
            outputs,
        })
    }
}

/// Lookup of rule classes by name.
///
/// Implementations are shared read-only across concurrent decodes.
pub trait RuleClassRegistry {
    fn rule_class(&self, name: &str) -> Option<&RuleClass>;
}

/// A fixed table of rule classes.
#[derive(Debug, Clone, Default)]
pub struct RuleClassMap {
    classes: FxHashMap<String, Arc<RuleClass>>,
}

impl RuleClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, replacing any class of the same name.
    pub fn register(&mut self, class: RuleClass) {
        self.classes.insert(class.name().to_string(), Arc::new(class));
    }

    /// Registers a class (builder style).
    pub fn with(mut self, class: RuleClass) -> Self {
        self.register(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl RuleClassRegistry for RuleClassMap {
    fn rule_class(&self, name: &str) -> Option<&RuleClass> {
        self.classes.get(name).map(Arc::as_ref)
    }
}

/// A rule instance within a package.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    label: Label,
    rule_class: String,
    location: Location,
    attributes: BTreeMap<String, ParsedAttribute>,
    outputs: Vec<Label>,
}

impl Rule {
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn name(&self) -> &str {
        self.label.name()
    }

    /// Name of the package owning this rule.
    pub fn package_name(&self) -> &str {
        self.label.package_name()
    }

    pub fn rule_class(&self) -> &str {
        &self.rule_class
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn attributes(&self) -> &BTreeMap<String, ParsedAttribute> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&ParsedAttribute> {
        self.attributes.get(name)
    }

    /// Shortcut to an attribute's value.
    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name).map(|a| &a.value)
    }

    /// Output files declared through output-typed attributes.
    pub fn outputs(&self) -> &[Label] {
        &self.outputs
    }
}
