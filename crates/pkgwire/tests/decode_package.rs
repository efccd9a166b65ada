//! End-to-end decoding of package messages.

use std::path::PathBuf;
use std::thread;

use prost::Message;
use proptest::prelude::*;

use pkgwire::model::{GlobCriteria, GlobList, LineAndColumn};
use pkgwire::wire::{self, Discriminator};
use pkgwire::{
    AttributeType, AttributeValue, BuildFileMap, DecodeError, DeserializerConfig, ErrorKind,
    EventKind, Interrupted, Label, PackageDeserializer, RuleClass, RuleClassMap, RuleVisibility,
};

fn registry() -> RuleClassMap {
    RuleClassMap::new()
        .with(RuleClass::new("genrule")
            .attr("outs", AttributeType::OutputList)
            .attr("srcs", AttributeType::LabelList)
            .attr("cmd", AttributeType::String)
            .attr("env", AttributeType::StringDict)
            .attr("deps_by_cpu", AttributeType::LabelListDict)
            .attr("copts_by_cpu", AttributeType::StringListDict))
        .with(RuleClass::new("filegroup").attr("srcs", AttributeType::LabelList))
}

fn deserializer() -> PackageDeserializer {
    let resolver = BuildFileMap::new()
        .with("pkg", "ws/pkg/BUILD")
        .with("other", "ws/other/BUILD");
    PackageDeserializer::new(DeserializerConfig::new(registry(), resolver))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn attr(name: &str, discriminator: Discriminator) -> wire::Attribute {
    wire::Attribute {
        name: name.to_string(),
        r#type: discriminator as i32,
        explicitly_specified: Some(true),
        ..Default::default()
    }
}

fn list_attr(name: &str, discriminator: Discriminator, items: &[&str]) -> wire::Attribute {
    wire::Attribute {
        string_list_value: strings(items),
        ..attr(name, discriminator)
    }
}

fn rule(name: &str, class: &str, attribute: Vec<wire::Attribute>) -> wire::Rule {
    wire::Rule {
        name: name.to_string(),
        rule_class: class.to_string(),
        attribute,
        parseable_location: None,
    }
}

fn package(rules: Vec<wire::Rule>) -> wire::Package {
    wire::Package {
        name: "pkg".to_string(),
        rule: rules,
        ..Default::default()
    }
}

#[test]
fn genrule_end_to_end() {
    let message = package(vec![rule(
        "//pkg:a",
        "genrule",
        vec![list_attr("outs", Discriminator::OutputList, &["//pkg:out.txt"])],
    )]);

    let decoded = deserializer().deserialize(&message).unwrap();
    let package = &decoded.package;

    assert_eq!(package.rules().len(), 1);
    let rule = &package.rules()[0];
    assert_eq!(rule.label().to_string(), "//pkg:a");
    assert_eq!(rule.attributes().len(), 1);

    let Some(AttributeValue::LabelList(outs)) = rule.value("outs") else {
        panic!("outs should decode to a label list");
    };
    assert_eq!(outs.items(), &[Label::parse("//pkg:out.txt").unwrap()]);
    assert!(outs.criteria().is_none());

    assert_eq!(package.output_files(), &[Label::parse("//pkg:out.txt").unwrap()]);
    assert!(!package.contains_errors());
    assert!(decoded.events.is_empty());
}

#[test]
fn duplicate_rule_names_abort() {
    let message = package(vec![
        rule("//pkg:a", "filegroup", vec![]),
        rule("//pkg:a", "filegroup", vec![]),
    ]);

    let err = deserializer().deserialize(&message).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameConflict);
    assert!(matches!(err, DecodeError::NameConflict { ref name, .. } if name == "a"));
}

#[test]
fn rule_conflicting_with_input_file_aborts() {
    let mut message = package(vec![rule("//pkg:data.txt", "filegroup", vec![])]);
    message.source_file = vec![wire::SourceFile {
        name: "//pkg:data.txt".to_string(),
        ..Default::default()
    }];

    let err = deserializer().deserialize(&message).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameConflict);
}

#[test]
fn rule_in_foreign_package_aborts() {
    let message = package(vec![rule("//other:a", "filegroup", vec![])]);
    let err = deserializer().deserialize(&message).unwrap_err();
    assert!(matches!(err, DecodeError::RuleOutsidePackage { .. }));
}

#[test]
fn unknown_rule_class_is_named() {
    let message = package(vec![rule("//pkg:a", "undefined_rule", vec![])]);
    let err = deserializer().deserialize(&message).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownRuleClass { ref rule_class } if rule_class == "undefined_rule"
    ));
    assert_eq!(err.to_string(), "invalid rule class 'undefined_rule'");
}

#[test]
fn default_visibility_flag_follows_wire() {
    let mut message = package(vec![]);
    message.default_visibility_label = strings(&["//pkg:friends", "//other:friends"]);
    message.default_visibility_set = Some(false);

    let decoded = deserializer().deserialize(&message).unwrap();
    assert!(!decoded.package.default_visibility_set());
    assert_eq!(decoded.package.default_visibility(), &RuleVisibility::Private);

    message.default_visibility_set = Some(true);
    let decoded = deserializer().deserialize(&message).unwrap();
    assert!(decoded.package.default_visibility_set());
    assert_eq!(decoded.package.default_visibility().labels().len(), 2);

    message.default_visibility_label = strings(&["//visibility:public"]);
    let decoded = deserializer().deserialize(&message).unwrap();
    assert_eq!(decoded.package.default_visibility(), &RuleVisibility::Public);

    message.default_visibility_set = None;
    let decoded = deserializer().deserialize(&message).unwrap();
    assert!(!decoded.package.default_visibility_set());
}

#[test]
fn explicit_list_provenance() {
    let mut srcs = list_attr("srcs", Discriminator::LabelList, &["//pkg:a.cc"]);
    srcs.glob_criteria = vec![wire::GlobCriteria {
        include: strings(&["a.cc"]),
        exclude: vec![],
        glob: Some(false),
    }];
    let plain = list_attr("srcs", Discriminator::LabelList, &["//pkg:b.cc"]);

    let message = package(vec![
        rule("//pkg:with", "filegroup", vec![srcs]),
        rule("//pkg:without", "filegroup", vec![plain]),
    ]);
    let decoded = deserializer().deserialize(&message).unwrap();

    let Some(AttributeValue::LabelList(list)) = decoded.package.rule("with").and_then(|r| r.value("srcs"))
    else {
        panic!("srcs should be a label list");
    };
    assert_eq!(
        list.criteria(),
        Some(
            &[GlobCriteria::Explicit {
                include: strings(&["a.cc"])
            }][..]
        )
    );
    assert!(list.criteria().unwrap()[0].exclude().is_empty());

    let Some(AttributeValue::LabelList(list)) =
        decoded.package.rule("without").and_then(|r| r.value("srcs"))
    else {
        panic!("srcs should be a label list");
    };
    assert!(list.criteria().is_none());
}

#[test]
fn location_keeps_offsets_without_lines() {
    let mut message = package(vec![rule("//pkg:a", "filegroup", vec![])]);
    message.rule[0].parseable_location = Some(wire::Location {
        start_offset: Some(120),
        end_offset: Some(180),
        ..Default::default()
    });

    let decoded = deserializer().deserialize(&message).unwrap();
    let location = decoded.package.rules()[0].location();
    assert_eq!(location.start_offset, 120);
    assert_eq!(location.end_offset, 180);
    assert_eq!(location.start, LineAndColumn::UNKNOWN);
    assert_eq!(location.end, LineAndColumn::UNKNOWN);
    assert_eq!(location.path(), std::path::Path::new("ws/pkg/BUILD"));
}

#[test]
fn dicts_survive_byte_round_trip() {
    let mut env = attr("env", Discriminator::StringDict);
    env.string_dict_value = vec![
        wire::StringDictEntry {
            key: "Z".to_string(),
            value: "1".to_string(),
        },
        wire::StringDictEntry {
            key: "A".to_string(),
            value: "2".to_string(),
        },
        wire::StringDictEntry {
            key: "Z".to_string(),
            value: "3".to_string(),
        },
    ];
    let mut deps = attr("deps_by_cpu", Discriminator::LabelListDict);
    deps.label_list_dict_value = vec![
        wire::LabelListDictEntry {
            key: "k8".to_string(),
            value: strings(&["//pkg:x", "//pkg:y"]),
        },
        wire::LabelListDictEntry {
            key: "arm".to_string(),
            value: strings(&["//pkg:z"]),
        },
    ];
    let mut copts = attr("copts_by_cpu", Discriminator::StringListDict);
    copts.string_list_dict_value = vec![
        wire::StringListDictEntry {
            key: "k8".to_string(),
            value: strings(&["-O2"]),
        },
        wire::StringListDictEntry {
            key: "k8".to_string(),
            value: strings(&["-g"]),
        },
    ];

    let message = package(vec![rule("//pkg:gen", "genrule", vec![env, deps, copts])]);
    let bytes = message.encode_to_vec();
    let decoded = deserializer().deserialize_bytes(&bytes).unwrap();
    let rule = decoded.package.rule("gen").unwrap();

    assert_eq!(
        rule.value("env"),
        Some(&AttributeValue::StringDict(vec![
            ("Z".to_string(), "1".to_string()),
            ("A".to_string(), "2".to_string()),
            ("Z".to_string(), "3".to_string()),
        ]))
    );
    let Some(AttributeValue::LabelListDict(deps)) = rule.value("deps_by_cpu") else {
        panic!("deps_by_cpu should be a label list dict");
    };
    assert_eq!(deps[0].0, "k8");
    assert_eq!(deps[0].1.len(), 2);
    assert_eq!(deps[1].0, "arm");
    assert_eq!(
        rule.value("copts_by_cpu"),
        Some(&AttributeValue::StringListDict(vec![
            ("k8".to_string(), strings(&["-O2"])),
            ("k8".to_string(), strings(&["-g"])),
        ]))
    );
    assert!(rule.attribute("env").unwrap().explicitly_specified);
}

#[test]
fn malformed_bytes_are_rejected() {
    let err = deserializer().deserialize_bytes(&[0x0a, 0xff, 0xff]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedMessage);
}

#[test]
fn producer_events_are_data() {
    let mut message = package(vec![]);
    message.contains_errors = Some(true);
    message.event = vec![wire::Event {
        kind: wire::EventKind::Error as i32,
        location: None,
        message: "rule 'x' failed analysis".to_string(),
    }];

    let decoded = deserializer().deserialize(&message).unwrap();
    assert!(decoded.package.contains_errors());
    assert_eq!(decoded.events.of_kind(EventKind::Error).count(), 1);
}

#[test]
fn input_file_visibility_and_license() {
    let mut message = package(vec![]);
    message.source_file = vec![
        wire::SourceFile {
            name: "//pkg:public.h".to_string(),
            visibility_label: strings(&["//visibility:public"]),
            license: Some(wire::License {
                license_type: strings(&["notice"]),
                exception: vec![],
            }),
            ..Default::default()
        },
        wire::SourceFile {
            name: "//pkg:plain.h".to_string(),
            ..Default::default()
        },
    ];

    let decoded = deserializer().deserialize(&message).unwrap();
    let public = decoded.package.input_file("public.h").unwrap();
    assert_eq!(public.visibility, Some(RuleVisibility::Public));
    assert!(public.license.is_some());

    let plain = decoded.package.input_file("plain.h").unwrap();
    assert_eq!(plain.visibility, None);
    assert_eq!(plain.license, None);
}

#[test]
fn legacy_variant_flags_subpackage_crossings() {
    let mut message = package(vec![rule(
        "//pkg:gen",
        "genrule",
        vec![list_attr("outs", Discriminator::OutputList, &["//pkg:sub/out.txt"])],
    )]);
    message.source_file = vec![wire::SourceFile {
        name: "//pkg:top.txt".to_string(),
        ..Default::default()
    }];

    let locator = |path: &str| -> Result<bool, Interrupted> { Ok(path == "pkg/sub") };
    let decoded = deserializer().deserialize_legacy(&message, &locator).unwrap();

    let crossings = decoded.package.subpackage_crossings();
    assert_eq!(crossings.len(), 1);
    assert_eq!(crossings[0].label.to_string(), "//pkg:sub/out.txt");
    assert!(decoded.package.package().contains_errors());
    assert!(decoded.events.has_errors());

    let clean = deserializer()
        .deserialize_legacy(&message, &pkgwire::EMPTY_PACKAGE_LOCATOR)
        .unwrap();
    assert!(!clean.package.package().contains_errors());
    assert!(clean.events.is_empty());
}

#[test]
fn independent_packages_decode_concurrently() {
    let deserializer = &deserializer();
    let messages: Vec<wire::Package> = (0..8)
        .map(|i| {
            let out = format!("//pkg:o{i}");
            package(vec![rule(
                &format!("//pkg:r{i}"),
                "genrule",
                vec![list_attr("outs", Discriminator::OutputList, &[out.as_str()])],
            )])
        })
        .collect();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = messages
            .iter()
            .map(|m| scope.spawn(move || deserializer.deserialize(m)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, result) in results.into_iter().enumerate() {
        let decoded = result.unwrap();
        assert_eq!(decoded.package.rules()[0].name(), format!("r{i}"));
    }
}

#[test]
fn resolver_closure_is_accepted() {
    let config = DeserializerConfig::new(registry(), |package: &str| {
        Some(PathBuf::from(format!("/src/{package}/BUILD")))
    });
    let decoded = PackageDeserializer::new(config)
        .deserialize(&package(vec![]))
        .unwrap();
    assert_eq!(decoded.package.package_directory(), std::path::Path::new("/src/pkg"));
}

fn arbitrary_package() -> impl Strategy<Value = wire::Package> {
    let names = prop::collection::btree_set("[a-z][a-z0-9_]{0,7}", 0..6);
    let dict = prop::collection::vec(("[A-Z]{1,3}", "[a-z0-9 ]{0,6}"), 0..5);
    (names, dict, any::<Option<bool>>()).prop_map(|(names, dict, testonly)| {
        let rules = names
            .into_iter()
            .map(|name| {
                let mut env = attr("env", Discriminator::StringDict);
                env.string_dict_value = dict
                    .iter()
                    .map(|(key, value)| wire::StringDictEntry {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect();
                rule(&format!("//pkg:{name}"), "genrule", vec![env])
            })
            .collect();
        wire::Package {
            default_testonly: testonly,
            ..package(rules)
        }
    })
}

proptest! {
    #[test]
    fn decoding_is_idempotent(message in arbitrary_package()) {
        let deserializer = deserializer();
        let bytes = message.encode_to_vec();
        let first = deserializer.deserialize_bytes(&bytes).unwrap();
        let second = deserializer.deserialize_bytes(&bytes).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.package.rules().len(), message.rule.len());
    }

    #[test]
    fn glob_provenance_does_not_affect_equality(patterns in prop::collection::vec("[a-z*]{1,5}", 1..4)) {
        let plain: GlobList<String> = GlobList::plain(vec!["a.cc".to_string()]);
        let globbed = GlobList::with_criteria(
            vec!["a.cc".to_string()],
            vec![GlobCriteria::Glob { include: patterns, exclude: vec![] }],
        );
        prop_assert_eq!(plain, globbed);
    }
}
