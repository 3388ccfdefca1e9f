/// Unique document identifier taken from the dump.
/// Example: `6a8f3c1e-0d2b-4c7a-9f1e-2b3c4d5e6f70`
pub type DocumentId = String;
/// Dot-joined key path naming a metadata field.
/// Examples: `properties.ccm:taxonid`, `collections.properties.cm:title`
pub type FieldName = String;
/// Identifier of one category column of a target field.
/// Example: `http://w3id.org/openeduhub/vocabs/discipline/380`
pub type CategoryUri = String;
/// Human-readable category name, absent when no label could be resolved.
/// Examples: `Some("Mathematik")`, `None`
pub type CategoryLabel = Option<String>;
/// A single processed token of a document.
/// Examples: `photosynthese`, `gleichung`
pub type Token = String;
/// A key path split into its components.
/// Example: `["properties", "ccm:taxonid"]`
pub type KeyPath = Vec<String>;
