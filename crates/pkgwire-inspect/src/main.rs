//! `pkgwire-inspect`: decode one serialized package and print a JSON summary.
//!
//! The rule-class registry is read from a JSON file mapping class names to
//! attribute types, e.g. `{"genrule": {"outs": "output_list", "cmd": "string"}}`.
//! Build files are resolved as `<root>/<package>/BUILD`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pkgwire::model::{Label, Package, RuleClass, RuleClassMap};
use pkgwire::{
    AttributeType, AttributeValue, DecodeError, DeserializerConfig, EventCollector, Interrupted,
    PackageDeserializer, decode_package_message,
};

#[derive(Parser, Debug)]
#[command(name = "pkgwire-inspect", version, about = "Decode a serialized build package")]
struct Cli {
    /// Serialized package message.
    message: PathBuf,

    /// JSON rule-class registry.
    #[arg(long)]
    registry: PathBuf,

    /// Workspace root containing the package directories.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Assemble through the legacy builder, checking subpackage boundaries.
    #[arg(long)]
    legacy: bool,
}

#[derive(Debug, Error)]
enum InspectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry: {0}")]
    Registry(#[from] serde_json::Error),

    #[error("rule class '{rule_class}' declares unknown attribute type '{type_name}'")]
    UnknownAttributeType {
        rule_class: String,
        type_name: String,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl InspectError {
    fn kind(&self) -> &'static str {
        match self {
            InspectError::Io { .. } => "io",
            InspectError::Registry(_) | InspectError::UnknownAttributeType { .. } => "registry",
            InspectError::Decode(e) => e.kind().name(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RegistryFile(BTreeMap<String, BTreeMap<String, String>>);

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => println!("{summary:#}"),
        Err(err) => {
            eprintln!("{}", json!({ "error": { "kind": err.kind(), "message": err.to_string() } }));
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<Value, InspectError> {
    let registry = load_registry(&cli.registry)?;
    tracing::info!(classes = registry.len(), "loaded rule-class registry");

    let bytes = read(&cli.message)?;
    let message = decode_package_message(&bytes)?;

    let root = cli.root.clone();
    let resolver = move |package: &str| {
        let path = root.join(package).join("BUILD");
        path.is_file().then_some(path)
    };
    let deserializer = PackageDeserializer::new(DeserializerConfig::new(registry, resolver));

    if cli.legacy {
        let root = cli.root.clone();
        let locator = move |path: &str| -> Result<bool, Interrupted> {
            Ok(root.join(path).join("BUILD").is_file())
        };
        let decoded = deserializer.deserialize_legacy(&message, &locator)?;
        let mut summary = summarize(decoded.package.package(), &decoded.events);
        summary["subpackage_crossings"] = decoded
            .package
            .subpackage_crossings()
            .iter()
            .map(|c| json!({ "label": c.label.to_string(), "subpackage": c.subpackage }))
            .collect();
        Ok(summary)
    } else {
        let decoded = deserializer.deserialize(&message)?;
        Ok(summarize(&decoded.package, &decoded.events))
    }
}

fn read(path: &Path) -> Result<Vec<u8>, InspectError> {
    fs::read(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_registry(path: &Path) -> Result<RuleClassMap, InspectError> {
    let RegistryFile(classes) = serde_json::from_slice(&read(path)?)?;
    let mut registry = RuleClassMap::new();
    for (name, attributes) in classes {
        let mut class = RuleClass::new(name.as_str());
        for (attribute, type_name) in attributes {
            let attr_type = AttributeType::from_name(&type_name).ok_or_else(|| {
                InspectError::UnknownAttributeType {
                    rule_class: name.clone(),
                    type_name: type_name.clone(),
                }
            })?;
            class = class.attr(attribute, attr_type);
        }
        registry.register(class);
    }
    Ok(registry)
}

fn summarize(package: &Package, events: &EventCollector) -> Value {
    let rules: Vec<Value> = package
        .rules()
        .iter()
        .map(|rule| {
            let attributes: serde_json::Map<String, Value> = rule
                .attributes()
                .iter()
                .map(|(name, attr)| (name.clone(), value_json(&attr.value)))
                .collect();
            json!({
                "label": rule.label().to_string(),
                "class": rule.rule_class(),
                "location": rule.location().to_string(),
                "attributes": attributes,
            })
        })
        .collect();

    json!({
        "name": package.name(),
        "build_file": package.build_file().display().to_string(),
        "default_visibility": labels_json(&package.default_visibility().labels()),
        "default_visibility_set": package.default_visibility_set(),
        "default_license": package.default_license().to_string(),
        "rules": rules,
        "input_files": package.input_files().iter().map(|f| f.label.to_string()).collect::<Vec<_>>(),
        "output_files": labels_json(package.output_files()),
        "package_groups": package.package_groups().iter().map(|g| json!({
            "label": g.label.to_string(),
            "packages": g.package_specs,
            "includes": labels_json(&g.includes),
        })).collect::<Vec<_>>(),
        "subincludes": package.subincludes().iter().map(|s| s.path.display().to_string()).collect::<Vec<_>>(),
        "events": events.events().iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        "contains_errors": package.contains_errors(),
    })
}

fn labels_json(labels: &[Label]) -> Value {
    labels.iter().map(|l| l.to_string()).collect()
}

fn value_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Integer(i) => json!(i),
        AttributeValue::String(s) => json!(s),
        AttributeValue::Label(l) => json!(l.to_string()),
        AttributeValue::StringList(list) => json!(list.items()),
        AttributeValue::LabelList(list) => labels_json(list.items()),
        AttributeValue::DistributionSet(set) => {
            set.iter().map(|d| d.as_str()).collect()
        }
        AttributeValue::License(license) => json!(license.to_string()),
        AttributeValue::StringDict(entries) => entries
            .iter()
            .map(|(k, v)| json!([k, v]))
            .collect(),
        AttributeValue::FilesetEntryList(entries) => entries
            .iter()
            .map(|e| {
                json!({
                    "src": e.src.to_string(),
                    "files": e.files.as_ref().map(|f| labels_json(f)),
                    "excludes": e.excludes,
                    "destdir": e.dest_dir,
                    "strip_prefix": e.strip_prefix,
                })
            })
            .collect(),
        AttributeValue::LabelListDict(entries) => entries
            .iter()
            .map(|(k, v)| json!([k, labels_json(v)]))
            .collect(),
        AttributeValue::StringListDict(entries) => entries
            .iter()
            .map(|(k, v)| json!([k, v]))
            .collect(),
        AttributeValue::Boolean(b) => json!(b),
        AttributeValue::TriState(t) => json!(t.as_str()),
    }
}
