//! Attribute value decoding.
//!
//! Dispatch is on the wire discriminator. The declared attribute type only
//! matters for the two no-dependency label kinds, which the serializer
//! writes as plain strings.

use std::path::Path;

use crate::codec::location::reconstruct;
use crate::codec::scalar::{decode_distribs, decode_license, decode_symlink_behavior, decode_tristate};
use crate::error::DecodeError;
use crate::model::{
    AttributeType, AttributeValue, FilesetEntry, GlobCriteria, GlobList, Label, ParsedAttribute,
    parse_labels,
};
use crate::wire::{self, Discriminator};

/// Decodes one attribute together with its metadata.
pub fn decode_attribute(
    declared: AttributeType,
    build_file: &Path,
    attr: &wire::Attribute,
) -> Result<ParsedAttribute, DecodeError> {
    Ok(ParsedAttribute {
        value: decode_attribute_value(declared, attr)?,
        explicitly_specified: attr.explicitly_specified.unwrap_or(false),
        location: reconstruct(build_file, attr.parseable_location.as_ref()),
    })
}

/// Decodes the value payload selected by the attribute's discriminator.
pub fn decode_attribute_value(
    declared: AttributeType,
    attr: &wire::Attribute,
) -> Result<AttributeValue, DecodeError> {
    let discriminator =
        Discriminator::try_from(attr.r#type).map_err(|_| unknown_encoding(attr))?;
    let string_value = attr.string_value.as_deref().unwrap_or_default();

    let value = match discriminator {
        Discriminator::Integer => AttributeValue::Integer(attr.int_value.unwrap_or_default()),
        Discriminator::String if declared == AttributeType::NodepLabel => {
            AttributeValue::Label(Label::parse(string_value)?)
        }
        Discriminator::String => AttributeValue::String(string_value.to_string()),
        Discriminator::Label | Discriminator::Output => {
            AttributeValue::Label(Label::parse(string_value)?)
        }
        Discriminator::StringList if declared == AttributeType::NodepLabelList => {
            AttributeValue::LabelList(decode_label_list(attr)?)
        }
        Discriminator::StringList => AttributeValue::StringList(decode_globs(
            attr.string_list_value.clone(),
            &attr.glob_criteria,
        )),
        Discriminator::LabelList | Discriminator::OutputList => {
            AttributeValue::LabelList(decode_label_list(attr)?)
        }
        Discriminator::DistributionSet => {
            AttributeValue::DistributionSet(decode_distribs(&attr.string_list_value)?)
        }
        Discriminator::License => {
            let license = attr.license.clone().unwrap_or_default();
            AttributeValue::License(decode_license(&license)?)
        }
        Discriminator::StringDict => AttributeValue::StringDict(
            attr.string_dict_value
                .iter()
                .map(|e| (e.key.clone(), e.value.clone()))
                .collect(),
        ),
        Discriminator::FilesetEntryList => {
            AttributeValue::FilesetEntryList(decode_fileset_entries(&attr.fileset_list_value)?)
        }
        Discriminator::LabelListDict => AttributeValue::LabelListDict(
            attr.label_list_dict_value
                .iter()
                .map(|e| Ok((e.key.clone(), parse_labels(&e.value)?)))
                .collect::<Result<_, DecodeError>>()?,
        ),
        Discriminator::StringListDict => AttributeValue::StringListDict(
            attr.string_list_dict_value
                .iter()
                .map(|e| (e.key.clone(), e.value.clone()))
                .collect(),
        ),
        Discriminator::Boolean => AttributeValue::Boolean(attr.boolean_value.unwrap_or(false)),
        Discriminator::Tristate => AttributeValue::TriState(decode_tristate(string_value)?),
        Discriminator::IntegerList | Discriminator::StringDictUnary | Discriminator::Unknown => {
            return Err(unknown_encoding(attr));
        }
    };
    Ok(value)
}

fn unknown_encoding(attr: &wire::Attribute) -> DecodeError {
    DecodeError::UnknownAttributeEncoding {
        attribute: attr.name.clone(),
        discriminator: attr.r#type,
    }
}

fn decode_label_list(attr: &wire::Attribute) -> Result<GlobList<Label>, DecodeError> {
    let labels = parse_labels(&attr.string_list_value)?;
    Ok(decode_globs(labels, &attr.glob_criteria))
}

/// Attaches glob provenance to decoded list items.
///
/// No criteria on the wire yields a plain list.
pub fn decode_globs<T>(items: Vec<T>, criteria: &[wire::GlobCriteria]) -> GlobList<T> {
    if criteria.is_empty() {
        return GlobList::plain(items);
    }
    let criteria = criteria
        .iter()
        .map(|c| {
            if c.glob.unwrap_or(false) {
                GlobCriteria::Glob {
                    include: c.include.clone(),
                    exclude: c.exclude.clone(),
                }
            } else {
                GlobCriteria::Explicit {
                    include: c.include.clone(),
                }
            }
        })
        .collect();
    GlobList::with_criteria(items, criteria)
}

pub fn decode_fileset_entries(
    entries: &[wire::FilesetEntry],
) -> Result<Vec<FilesetEntry>, DecodeError> {
    entries.iter().map(decode_fileset_entry).collect()
}

fn decode_fileset_entry(entry: &wire::FilesetEntry) -> Result<FilesetEntry, DecodeError> {
    let files = if entry.files_present.unwrap_or(false) {
        Some(parse_labels(&entry.file)?)
    } else {
        None
    };
    let excludes = if entry.exclude.is_empty() {
        None
    } else {
        Some(entry.exclude.clone())
    };

    Ok(FilesetEntry {
        src: Label::parse(&entry.source)?,
        files,
        excludes,
        dest_dir: entry.destination_directory.clone(),
        symlink_behavior: decode_symlink_behavior(entry.symlink_behavior)?,
        strip_prefix: entry.strip_prefix.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{SymlinkBehavior, TriState};

    fn attr(name: &str, discriminator: Discriminator) -> wire::Attribute {
        wire::Attribute {
            name: name.to_string(),
            r#type: discriminator as i32,
            ..Default::default()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_string_vs_nodep_label() {
        let mut a = attr("tool", Discriminator::String);
        a.string_value = Some("//tools:gen".to_string());

        let plain = decode_attribute_value(AttributeType::String, &a).unwrap();
        assert_eq!(plain, AttributeValue::String("//tools:gen".to_string()));

        let label = decode_attribute_value(AttributeType::NodepLabel, &a).unwrap();
        assert_eq!(label, AttributeValue::Label(Label::parse("//tools:gen").unwrap()));
    }

    #[test]
    fn test_string_list_vs_nodep_label_list() {
        let mut a = attr("data", Discriminator::StringList);
        a.string_list_value = strings(&["//a:b", "//c:d"]);

        match decode_attribute_value(AttributeType::NodepLabelList, &a).unwrap() {
            AttributeValue::LabelList(list) => assert_eq!(list.len(), 2),
            other => panic!("unexpected value {other:?}"),
        }
        match decode_attribute_value(AttributeType::StringList, &a).unwrap() {
            AttributeValue::StringList(list) => assert_eq!(list[0], "//a:b"),
            other => panic!("unexpected value {other:?}"),
        }

        a.string_list_value = strings(&["not a label"]);
        let err = decode_attribute_value(AttributeType::NodepLabelList, &a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLabel);
    }

    #[test]
    fn test_output_list_ignores_declared_type() {
        let mut a = attr("outs", Discriminator::OutputList);
        a.string_list_value = strings(&["//pkg:out.txt"]);

        let value = decode_attribute_value(AttributeType::String, &a).unwrap();
        match value {
            AttributeValue::LabelList(list) => {
                assert_eq!(list.items(), &[Label::parse("//pkg:out.txt").unwrap()]);
                assert!(list.criteria().is_none());
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_glob_provenance() {
        let mut a = attr("srcs", Discriminator::LabelList);
        a.string_list_value = strings(&["//pkg:a.cc", "//pkg:main.cc"]);
        a.glob_criteria = vec![
            wire::GlobCriteria {
                include: strings(&["*.cc"]),
                exclude: strings(&["*_test.cc"]),
                glob: Some(true),
            },
            wire::GlobCriteria {
                include: strings(&["main.cc"]),
                exclude: vec![],
                glob: Some(false),
            },
        ];

        let AttributeValue::LabelList(list) =
            decode_attribute_value(AttributeType::LabelList, &a).unwrap()
        else {
            panic!("expected label list");
        };
        let criteria = list.criteria().unwrap();
        assert!(criteria[0].is_glob());
        assert_eq!(criteria[0].exclude(), strings(&["*_test.cc"]).as_slice());
        assert_eq!(
            criteria[1],
            GlobCriteria::Explicit {
                include: strings(&["main.cc"])
            }
        );
        assert!(criteria[1].exclude().is_empty());
    }

    #[test]
    fn test_dicts_keep_order_and_duplicates() {
        let mut a = attr("env", Discriminator::StringDict);
        a.string_dict_value = vec![
            wire::StringDictEntry {
                key: "b".to_string(),
                value: "1".to_string(),
            },
            wire::StringDictEntry {
                key: "a".to_string(),
                value: "2".to_string(),
            },
            wire::StringDictEntry {
                key: "b".to_string(),
                value: "3".to_string(),
            },
        ];
        let value = decode_attribute_value(AttributeType::StringDict, &a).unwrap();
        assert_eq!(
            value,
            AttributeValue::StringDict(vec![
                ("b".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
                ("b".to_string(), "3".to_string()),
            ])
        );

        let mut a = attr("deps_map", Discriminator::LabelListDict);
        a.label_list_dict_value = vec![wire::LabelListDictEntry {
            key: "x".to_string(),
            value: strings(&["//x:y"]),
        }];
        let value = decode_attribute_value(AttributeType::LabelListDict, &a).unwrap();
        assert_eq!(value.labels().len(), 1);
    }

    #[test]
    fn test_scalars() {
        let mut a = attr("n", Discriminator::Integer);
        a.int_value = Some(-7);
        assert_eq!(
            decode_attribute_value(AttributeType::Integer, &a).unwrap(),
            AttributeValue::Integer(-7)
        );

        let mut a = attr("b", Discriminator::Boolean);
        a.boolean_value = Some(true);
        assert_eq!(
            decode_attribute_value(AttributeType::Boolean, &a).unwrap(),
            AttributeValue::Boolean(true)
        );

        let mut a = attr("stamp", Discriminator::Tristate);
        a.string_value = Some("auto".to_string());
        assert_eq!(
            decode_attribute_value(AttributeType::Tristate, &a).unwrap(),
            AttributeValue::TriState(TriState::Auto)
        );
    }

    #[test]
    fn test_unsupported_discriminators() {
        for raw in [
            Discriminator::IntegerList as i32,
            Discriminator::StringDictUnary as i32,
            Discriminator::Unknown as i32,
            0,
            99,
        ] {
            let mut a = attr("x", Discriminator::Integer);
            a.r#type = raw;
            let err = decode_attribute_value(AttributeType::Integer, &a).unwrap_err();
            assert!(matches!(
                err,
                DecodeError::UnknownAttributeEncoding { discriminator, .. } if discriminator == raw
            ));
        }
    }

    #[test]
    fn test_fileset_three_state_lists() {
        let entries = vec![
            wire::FilesetEntry {
                source: "//pkg:srcs".to_string(),
                destination_directory: "out".to_string(),
                ..Default::default()
            },
            wire::FilesetEntry {
                source: "//pkg:srcs".to_string(),
                destination_directory: "out".to_string(),
                files_present: Some(true),
                exclude: strings(&["secret.txt"]),
                symlink_behavior: Some(wire::SymlinkBehavior::Dereference as i32),
                strip_prefix: Some("gen".to_string()),
                ..Default::default()
            },
            wire::FilesetEntry {
                source: "//pkg:srcs".to_string(),
                files_present: Some(true),
                file: strings(&["//pkg:a.txt"]),
                ..Default::default()
            },
        ];

        let decoded = decode_fileset_entries(&entries).unwrap();
        assert_eq!(decoded[0].files, None);
        assert_eq!(decoded[0].excludes, None);
        assert_eq!(decoded[0].symlink_behavior, SymlinkBehavior::Copy);

        assert_eq!(decoded[1].files, Some(vec![]));
        assert_eq!(decoded[1].excludes, Some(strings(&["secret.txt"])));
        assert_eq!(decoded[1].symlink_behavior, SymlinkBehavior::Dereference);
        assert_eq!(decoded[1].strip_prefix.as_deref(), Some("gen"));

        assert_eq!(decoded[2].files.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_decode_attribute_metadata() {
        let mut a = attr("cmd", Discriminator::String);
        a.string_value = Some("touch $@".to_string());
        a.explicitly_specified = Some(true);
        a.parseable_location = Some(wire::Location {
            start_offset: Some(3),
            end_offset: Some(12),
            ..Default::default()
        });

        let parsed = decode_attribute(AttributeType::String, Path::new("pkg/BUILD"), &a).unwrap();
        assert!(parsed.explicitly_specified);
        assert_eq!(parsed.location.start_offset, 3);
        assert_eq!(parsed.location.path(), Path::new("pkg/BUILD"));
    }
}
