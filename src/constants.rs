/// Key paths of commonly used metadata fields.
pub mod fields {
    /// Typical age range of the audience.
    pub const AGE: &str = "properties.ccm:educationaltypicalagerange";
    /// Titles of the collections a record belongs to.
    pub const COLLECTIONS_TITLE: &str = "collections.properties.cm:title";
    /// Node ids of the collections a record belongs to.
    pub const COLLECTIONS_UUID: &str = "collections.nodeRef.id";
    /// Competences addressed by the material.
    pub const COMPETENCE: &str = "properties.ccm:competence";
    /// Free-text description (stored as a single-entry list upstream).
    pub const DESCRIPTION: &str = "properties.cclom:general_description";
    /// Educational context (school level).
    pub const EDUCATIONAL_CONTEXT: &str = "properties.ccm:educationalcontext";
    /// Age rating.
    pub const FSK_RATING: &str = "properties.ccm:fskRating";
    /// Unique document id.
    pub const ID: &str = "nodeRef.id";
    /// Controlled keywords.
    pub const KEYWORDS_CONTROLLED: &str = "properties.cclom:classification_keyword";
    /// Free keywords.
    pub const KEYWORDS_FREE: &str = "properties.cclom:general_keyword";
    /// Content language(s).
    pub const LANGUAGE: &str = "properties.cclom:general_language";
    /// Learning resource type.
    pub const LRT: &str = "properties.ccm:oeh_lrt";
    /// School discipline.
    pub const TAXONID: &str = "properties.ccm:taxonid";
    /// University discipline.
    pub const TAXONID_UNIVERSITY: &str = "properties.ccm:oeh_taxonid_university";
    /// Markers of pre-existing test-set membership, one entry per field name.
    pub const TEST_DATA: &str = "test_data";
    /// Title of the material.
    pub const TITLE: &str = "properties.cclom:title";
    /// Curriculum topic.
    pub const TOPIC: &str = "properties.ccm:curriculum";
    /// Source URL of the material.
    pub const URL: &str = "properties.ccm:wwwurl";
}

/// Sentinel values the canonical filters compare against.
pub mod filters {
    /// Key path of the storage protocol tag.
    pub const STORE_PROTOCOL_FIELD: &str = "nodeRef.storeRef.protocol";
    /// Storage protocol of regular repository nodes.
    pub const STORE_PROTOCOL: &str = "workspace";
    /// Key path of the node type tag.
    pub const TYPE_FIELD: &str = "type";
    /// Node type of learning materials.
    pub const MATERIAL_TYPE: &str = "ccm:io";
    /// Key path of the metadata schema tag.
    pub const METADATASET_FIELD: &str = "properties.cm:edu_metadataset";
    /// Metadata schema of admissible records.
    pub const METADATASET: &str = "mds_oeh";
    /// Key path of the aspect list.
    pub const ASPECTS_FIELD: &str = "aspects";
    /// Aspect marking a reference copy of a material inside a collection.
    pub const COLLECTION_REFERENCE_ASPECT: &str = "ccm:collection_io_reference";
    /// Key path of the record's own read permissions.
    pub const READ_PERMISSIONS_FIELD: &str = "permissions.Read";
    /// Key path of the read permissions of associated collections.
    pub const COLLECTION_READ_PERMISSIONS_FIELD: &str = "collections.permissions.Read";
    /// Group granting public read access.
    pub const PUBLIC_GROUP: &str = "GROUP_EVERYONE";
    /// Title of the collection holding editorially confirmed materials.
    pub const EDITORIAL_COLLECTION: &str = "Redaktionsbuffet";
}

/// Constants of the bag-of-words representation.
pub mod bow {
    /// Name of the virtual target entry holding bag-of-words counts.
    pub const BOW_FIELD: &str = "bows";
    /// Largest count stored per token and document.
    pub const MAX_TOKEN_COUNT: u8 = u8::MAX;
}

/// Defaults of the dump reader and the quality pipeline.
pub mod pipeline {
    /// Key path every dump line is sliced to before processing.
    pub const DEFAULT_PREFIX: &str = "_source";
    /// Separator splitting dot-joined key paths.
    pub const DEFAULT_KEY_SEPARATOR: &str = ".";
    /// Minimum number of tokens per document.
    pub const DEFAULT_MIN_DOCUMENT_LENGTH: u64 = 10;
    /// Minimum number of documents containing each vocabulary token.
    pub const DEFAULT_MIN_TOKEN_SUPPORT: usize = 5;
    /// Minimum number of documents assigned to each category.
    pub const DEFAULT_MIN_CATEGORY_SUPPORT: usize = 10;
    /// Tokens above this share of all token occurrences are dropped.
    pub const DEFAULT_MAX_TOKEN_SHARE: f64 = 0.005;
    /// Tokens longer than this many characters are dropped.
    pub const DEFAULT_MAX_TOKEN_CHARS: usize = 30;
    /// Minimum characters of title or description during import.
    pub const DEFAULT_MIN_TEXT_CHARS: usize = 30;
    /// Language accepted by the default pipeline.
    pub const DEFAULT_LANGUAGE: &str = "de";
    /// Key path of SKOS concept ids.
    pub const SKOS_ID_PATH: &str = "id";
    /// Key path of SKOS preferred labels.
    pub const SKOS_LABEL_PATH: &str = "prefLabel.de";
    /// Keys holding SKOS child concepts.
    pub const SKOS_CHILD_FIELDS: [&str; 2] = ["hasTopConcept", "narrower"];
}

/// Controlled vocabularies referenced by the default value fixes.
pub mod vocabs {
    /// Base URI of school discipline concepts.
    pub const DISCIPLINE_BASE: &str = "http://w3id.org/openeduhub/vocabs/discipline/";
}
