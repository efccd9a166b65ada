//! Wire schema for serialized packages.
//!
//! These are the protocol-buffer messages emitted by the build-file
//! parser. Field numbers are part of the external contract and must not be
//! renumbered. Enumerations are carried as raw `i32` so that values from a
//! newer producer survive decoding and can be rejected (or ignored)
//! explicitly.

/// Source location of a located entity.
///
/// All fields are optional on the wire; see [`crate::codec::location`] for
/// how partial data is interpreted.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Location {
    #[prost(int32, optional, tag = "1")]
    pub start_offset: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub start_line: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub start_column: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub end_offset: Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub end_line: Option<i32>,
    #[prost(int32, optional, tag = "6")]
    pub end_column: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct License {
    #[prost(string, repeated, tag = "1")]
    pub license_type: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub exception: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringDictEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LabelListDictEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, repeated, tag = "2")]
    pub value: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringListDictEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, repeated, tag = "2")]
    pub value: Vec<String>,
}

/// One `glob()` call or literal list that contributed to a list attribute.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GlobCriteria {
    #[prost(string, repeated, tag = "1")]
    pub include: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub exclude: Vec<String>,
    #[prost(bool, optional, tag = "3")]
    pub glob: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SymlinkBehavior {
    Copy = 1,
    Dereference = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilesetEntry {
    #[prost(string, tag = "1")]
    pub source: String,
    #[prost(string, tag = "2")]
    pub destination_directory: String,
    #[prost(string, repeated, tag = "3")]
    pub file: Vec<String>,
    #[prost(string, repeated, tag = "4")]
    pub exclude: Vec<String>,
    /// Absent means [`SymlinkBehavior::Copy`].
    #[prost(enumeration = "SymlinkBehavior", optional, tag = "5")]
    pub symlink_behavior: Option<i32>,
    #[prost(string, optional, tag = "6")]
    pub strip_prefix: Option<String>,
    /// Distinguishes an explicit empty `files` list from an absent one.
    #[prost(bool, optional, tag = "7")]
    pub files_present: Option<bool>,
}

/// Wire discriminant of an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Discriminator {
    Integer = 1,
    String = 2,
    Label = 3,
    Output = 4,
    StringList = 5,
    LabelList = 6,
    OutputList = 7,
    DistributionSet = 8,
    License = 9,
    StringDict = 10,
    FilesetEntryList = 11,
    LabelListDict = 12,
    StringListDict = 13,
    Boolean = 14,
    Tristate = 15,
    IntegerList = 16,
    StringDictUnary = 17,
    Unknown = 18,
}

/// One attribute of a rule. Exactly one value payload is meaningful,
/// selected by `type`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Attribute {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "Discriminator", tag = "2")]
    pub r#type: i32,
    #[prost(int32, optional, tag = "3")]
    pub int_value: Option<i32>,
    #[prost(message, optional, tag = "4")]
    pub license: Option<License>,
    #[prost(string, optional, tag = "5")]
    pub string_value: Option<String>,
    #[prost(string, repeated, tag = "6")]
    pub string_list_value: Vec<String>,
    #[prost(message, repeated, tag = "7")]
    pub string_dict_value: Vec<StringDictEntry>,
    #[prost(message, repeated, tag = "8")]
    pub fileset_list_value: Vec<FilesetEntry>,
    #[prost(message, repeated, tag = "9")]
    pub label_list_dict_value: Vec<LabelListDictEntry>,
    #[prost(message, repeated, tag = "10")]
    pub string_list_dict_value: Vec<StringListDictEntry>,
    #[prost(message, optional, tag = "12")]
    pub parseable_location: Option<Location>,
    #[prost(bool, optional, tag = "13")]
    pub explicitly_specified: Option<bool>,
    #[prost(bool, optional, tag = "14")]
    pub boolean_value: Option<bool>,
    #[prost(message, repeated, tag = "16")]
    pub glob_criteria: Vec<GlobCriteria>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rule {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub rule_class: String,
    #[prost(message, repeated, tag = "4")]
    pub attribute: Vec<Attribute>,
    #[prost(message, optional, tag = "8")]
    pub parseable_location: Option<Location>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourceFile {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "5")]
    pub visibility_label: Vec<String>,
    #[prost(message, optional, tag = "7")]
    pub parseable_location: Option<Location>,
    #[prost(message, optional, tag = "8")]
    pub license: Option<License>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PackageGroup {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub contained_package: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub included_package_group: Vec<String>,
    #[prost(message, optional, tag = "4")]
    pub parseable_location: Option<Location>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MakeVarBinding {
    #[prost(string, tag = "1")]
    pub value: String,
    #[prost(string, tag = "2")]
    pub platform_set_regexp: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MakeVar {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub binding: Vec<MakeVarBinding>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventKind {
    Error = 1,
    Warning = 2,
    Info = 3,
    Progress = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    #[prost(enumeration = "EventKind", tag = "1")]
    pub kind: i32,
    #[prost(message, optional, tag = "2")]
    pub location: Option<Location>,
    #[prost(string, tag = "3")]
    pub message: String,
}

/// A whole serialized package.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Package {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, optional, tag = "3")]
    pub default_visibility_set: Option<bool>,
    #[prost(string, repeated, tag = "4")]
    pub default_visibility_label: Vec<String>,
    #[prost(bool, optional, tag = "5")]
    pub default_obsolete: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub default_testonly: Option<bool>,
    #[prost(string, optional, tag = "7")]
    pub default_deprecation: Option<String>,
    #[prost(message, optional, tag = "10")]
    pub default_license: Option<License>,
    #[prost(string, repeated, tag = "11")]
    pub default_distrib: Vec<String>,
    #[prost(string, repeated, tag = "12")]
    pub subinclude_label: Vec<String>,
    #[prost(message, repeated, tag = "13")]
    pub make_variable: Vec<MakeVar>,
    #[prost(message, repeated, tag = "14")]
    pub source_file: Vec<SourceFile>,
    #[prost(message, repeated, tag = "15")]
    pub package_group: Vec<PackageGroup>,
    #[prost(message, repeated, tag = "16")]
    pub rule: Vec<Rule>,
    #[prost(message, repeated, tag = "17")]
    pub event: Vec<Event>,
    #[prost(bool, optional, tag = "18")]
    pub contains_errors: Option<bool>,
}
