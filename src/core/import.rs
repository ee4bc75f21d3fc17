use crate::domain::model::{HasMatchKey, ImportDecision, ImportRecord};
use crate::domain::ports::{BatchIdSource, UuidBatchIds};
use crate::utils::error::{DefineryError, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

const SECTION_DELIMITER: char = '*';
const SECTION_COUNT: usize = 4;
const GROUP_SECTION: usize = 2;
const PARAMETER_SECTION: usize = 3;
const GROUP_TAG: &str = "GROUP";

// PARAM  GUID  NAME  DATATYPE  DATACATEGORY  GROUP  VISIBLE  DESCRIPTION  USERMODIFIABLE
const COL_GUID: usize = 1;
const COL_NAME: usize = 2;
const COL_DATA_TYPE: usize = 3;
const COL_DATA_CATEGORY: usize = 4;
const COL_GROUP: usize = 5;
const COL_VISIBLE: usize = 6;
const COL_DESCRIPTION: usize = 7;
const COL_USER_MODIFIABLE: usize = 8;
const REQUIRED_COLUMNS: usize = COL_VISIBLE + 1;

/// How per-line problems are handled while parsing a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    /// Skip bad lines and leave unresolved groups empty.
    #[default]
    Lenient,
    /// Abort the whole parse on the first bad line or unresolved group.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub batch_id: String,
    pub records: Vec<ImportRecord>,
    pub rejected: Vec<RejectedLine>,
}

/// Group id to group name, built from the document's group section.
#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    names: HashMap<u32, String>,
}

impl GroupTable {
    pub fn parse(section: &str) -> Result<Self> {
        let mut names = HashMap::new();
        for row in tab_reader(section).records() {
            let row = row?;
            let mut fields = row.iter();
            let mut first = fields.next().unwrap_or_default();
            if first == GROUP_TAG {
                first = fields.next().unwrap_or_default();
            }
            // Header rows ("GROUP ID NAME") carry no numeric id.
            let Ok(id) = first.trim().parse::<u32>() else {
                continue;
            };
            let name = fields.next().unwrap_or_default().to_string();
            names.entry(id).or_insert(name);
        }
        Ok(Self { names })
    }

    pub fn resolve(&self, group_ref: u32) -> Option<&str> {
        self.names.get(&group_ref).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parses shared parameter interchange documents and decides create-or-skip per record.
pub struct BatchImporter<I: BatchIdSource = UuidBatchIds> {
    policy: ImportPolicy,
    ids: I,
}

impl BatchImporter {
    pub fn new(policy: ImportPolicy) -> Self {
        Self::with_id_source(policy, UuidBatchIds)
    }
}

impl Default for BatchImporter {
    fn default() -> Self {
        Self::new(ImportPolicy::default())
    }
}

impl<I: BatchIdSource> BatchImporter<I> {
    pub fn with_id_source(policy: ImportPolicy, ids: I) -> Self {
        Self { policy, ids }
    }

    pub fn policy(&self) -> ImportPolicy {
        self.policy
    }

    pub fn parse(&self, document: &str) -> Result<ParsedDocument> {
        let sections: Vec<&str> = document.split(SECTION_DELIMITER).collect();
        if sections.len() != SECTION_COUNT {
            return Err(DefineryError::MalformedDocument {
                sections: sections.len(),
            });
        }

        let batch_id = self.ids.next_batch_id();
        let groups = GroupTable::parse(sections[GROUP_SECTION])?;
        tracing::debug!(batch_id = %batch_id, groups = groups.len(), "Parsing parameter table");

        // Each '*' opens its section's header line, so newlines before it give the line number.
        let header_line = sections[..PARAMETER_SECTION]
            .iter()
            .map(|s| s.matches('\n').count())
            .sum::<usize>()
            + 1;
        let body = match sections[PARAMETER_SECTION].split_once('\n') {
            Some((_header, body)) => body,
            None => "",
        };

        let mut records = Vec::new();
        let mut rejected = Vec::new();
        for row in tab_reader(body).records() {
            let row = row?;
            let line = header_line + row.position().map_or(0, |p| p.line() as usize);
            if row.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            match self.parse_row(&row, &groups, &batch_id) {
                Ok(record) => records.push(record),
                Err(reason) => match self.policy {
                    ImportPolicy::Strict => {
                        return Err(DefineryError::InvalidRecord { line, reason });
                    }
                    ImportPolicy::Lenient => {
                        tracing::warn!("Skipping line {}: {}", line, reason);
                        rejected.push(RejectedLine { line, reason });
                    }
                },
            }
        }

        tracing::debug!(
            batch_id = %batch_id,
            records = records.len(),
            rejected = rejected.len(),
            "Parsed shared parameter document"
        );
        Ok(ParsedDocument {
            batch_id,
            records,
            rejected,
        })
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        groups: &GroupTable,
        batch_id: &str,
    ) -> std::result::Result<ImportRecord, String> {
        if row.len() < REQUIRED_COLUMNS {
            return Err(format!(
                "expected at least {} columns, found {}",
                REQUIRED_COLUMNS,
                row.len()
            ));
        }
        let field = |index: usize| row.get(index).unwrap_or_default();

        let name = field(COL_NAME).trim();
        if name.is_empty() {
            return Err("parameter name is empty".to_string());
        }

        let guid = Uuid::parse_str(field(COL_GUID).trim())
            .map_err(|e| format!("malformed GUID '{}': {}", field(COL_GUID), e))?;

        let group_ref = field(COL_GROUP)
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("group reference '{}' is not numeric", field(COL_GROUP)))?;

        let group_name = match groups.resolve(group_ref) {
            Some(name) => name.to_string(),
            None if self.policy == ImportPolicy::Strict => {
                return Err(format!("group {} is not defined in the group table", group_ref));
            }
            None => String::new(),
        };

        Ok(ImportRecord {
            name: name.to_string(),
            guid,
            group_ref,
            group_name,
            data_type: field(COL_DATA_TYPE).to_string(),
            data_category: field(COL_DATA_CATEGORY).to_string(),
            description: field(COL_DESCRIPTION).to_string(),
            visible: field(COL_VISIBLE).to_string(),
            user_modifiable: row.get(COL_USER_MODIFIABLE).unwrap_or("1").to_string(),
            batch_id: batch_id.to_string(),
        })
    }

    /// `Skip` iff any of `existing` satisfies `predicate`. Never performs a remote call.
    pub fn classify<E, P>(&self, record: &ImportRecord, existing: &[E], predicate: P) -> ImportDecision
    where
        P: Fn(&ImportRecord, &E) -> bool,
    {
        if existing.iter().any(|candidate| predicate(record, candidate)) {
            ImportDecision::Skip
        } else {
            ImportDecision::Create
        }
    }
}

/// Same name, same data type and same group.
pub fn is_exact_match<E: HasMatchKey>(record: &ImportRecord, existing: &E) -> bool {
    record.match_key() == existing.match_key()
}

fn tab_reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SharedParameter;

    const GUID_A: &str = "7f3a1c52-2b1e-4d8e-9a55-0a6c7c1d2e01";
    const GUID_B: &str = "0b9d4e61-8c2f-4a71-b3d0-5e6f7a8b9c02";

    struct FixedIds;

    impl BatchIdSource for FixedIds {
        fn next_batch_id(&self) -> String {
            "batch-1".to_string()
        }
    }

    fn document(params: &[String]) -> String {
        let mut doc = String::from(
            "# This is a Revit shared parameter file.\n# Do not edit manually.\n\
             *META\tVERSION\tMINVERSION\nMETA\t2\t1\n\
             *GROUP\tID\tNAME\nGROUP\t1\tIdentity Data\nGROUP\t2\tDimensions\n\
             *PARAM\tGUID\tNAME\tDATATYPE\tDATACATEGORY\tGROUP\tVISIBLE\tDESCRIPTION\tUSERMODIFIABLE\n",
        );
        for line in params {
            doc.push_str(line);
            doc.push('\n');
        }
        doc
    }

    fn param(guid: &str, name: &str, data_type: &str, group: &str) -> String {
        format!("PARAM\t{guid}\t{name}\t{data_type}\t\t{group}\t1\tSome description\t0")
    }

    fn importer(policy: ImportPolicy) -> BatchImporter<FixedIds> {
        BatchImporter::with_id_source(policy, FixedIds)
    }

    #[test]
    fn test_three_sections_is_malformed() {
        let doc = "intro\n*META\tVERSION\n*GROUP\tID\tNAME\nGROUP\t1\tData\n";
        let err = BatchImporter::default().parse(doc).unwrap_err();
        assert!(matches!(err, DefineryError::MalformedDocument { sections: 3 }));
    }

    #[test]
    fn test_five_sections_is_malformed() {
        let doc = document(&[param(GUID_A, "Rating*", "TEXT", "1")]);
        let err = BatchImporter::default().parse(&doc).unwrap_err();
        assert!(matches!(err, DefineryError::MalformedDocument { sections: 5 }));
    }

    #[test]
    fn test_single_data_line_yields_one_record() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "1")]);
        let parsed = importer(ImportPolicy::Lenient).parse(&doc).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.rejected.is_empty());
        let record = &parsed.records[0];
        assert_eq!(record.name, "Fire Rating");
        assert_eq!(record.guid, Uuid::parse_str(GUID_A).unwrap());
        assert_eq!(record.data_type, "TEXT");
        assert_eq!(record.group_ref, 1);
        assert_eq!(record.group_name, "Identity Data");
        assert_eq!(record.visible, "1");
        assert_eq!(record.description, "Some description");
        assert_eq!(record.user_modifiable, "0");
        assert_eq!(record.batch_id, "batch-1");
    }

    #[test]
    fn test_records_share_batch_id_and_keep_order() {
        let doc = document(&[
            param(GUID_A, "Fire Rating", "TEXT", "1"),
            String::new(),
            param(GUID_B, "Clear Width", "LENGTH", "2"),
        ]);
        let parsed = BatchImporter::default().parse(&doc).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].name, "Fire Rating");
        assert_eq!(parsed.records[1].name, "Clear Width");
        assert_eq!(parsed.records[1].group_name, "Dimensions");
        assert!(parsed.records.iter().all(|r| r.batch_id == parsed.batch_id));
        assert!(Uuid::parse_str(&parsed.batch_id).is_ok());
    }

    #[test]
    fn test_each_parse_gets_fresh_batch_id() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "1")]);
        let importer = BatchImporter::default();
        let first = importer.parse(&doc).unwrap();
        let second = importer.parse(&doc).unwrap();
        assert_ne!(first.batch_id, second.batch_id);
    }

    #[test]
    fn test_header_only_table_yields_nothing() {
        let parsed = importer(ImportPolicy::Strict).parse(&document(&[])).unwrap();
        assert!(parsed.records.is_empty());
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_unresolved_group_is_empty_when_lenient() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "9")]);
        let parsed = importer(ImportPolicy::Lenient).parse(&doc).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].group_ref, 9);
        assert_eq!(parsed.records[0].group_name, "");
    }

    #[test]
    fn test_unresolved_group_fails_when_strict() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "9")]);
        let err = importer(ImportPolicy::Strict).parse(&doc).unwrap_err();
        match err {
            DefineryError::InvalidRecord { line, reason } => {
                assert_eq!(line, 9);
                assert!(reason.contains("group 9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_guid_is_rejected_when_lenient() {
        let doc = document(&[
            param("not-a-guid", "Broken", "TEXT", "1"),
            param(GUID_B, "Clear Width", "LENGTH", "2"),
        ]);
        let parsed = importer(ImportPolicy::Lenient).parse(&doc).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].name, "Clear Width");
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].line, 9);
        assert!(parsed.rejected[0].reason.contains("malformed GUID"));
    }

    #[test]
    fn test_bad_line_aborts_when_strict() {
        let doc = document(&[
            param(GUID_A, "Fire Rating", "TEXT", "1"),
            "PARAM\tshort\tline".to_string(),
        ]);
        let err = importer(ImportPolicy::Strict).parse(&doc).unwrap_err();
        assert!(matches!(err, DefineryError::InvalidRecord { line: 10, .. }));
    }

    #[test]
    fn test_older_layout_without_description_columns() {
        let doc = document(&[format!("PARAM\t{GUID_A}\tFire Rating\tTEXT\t\t1\t1")]);
        let parsed = importer(ImportPolicy::Strict).parse(&doc).unwrap();
        assert_eq!(parsed.records[0].description, "");
        assert_eq!(parsed.records[0].user_modifiable, "1");
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "2")]).replace('\n', "\r\n");
        let parsed = importer(ImportPolicy::Strict).parse(&doc).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].group_name, "Dimensions");
        assert_eq!(parsed.records[0].user_modifiable, "0");
    }

    #[test]
    fn test_group_table_without_tag_column() {
        let groups = GroupTable::parse("ID\tNAME\n4\tConstraints\n7\tGraphics\n").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.resolve(7), Some("Graphics"));
        assert_eq!(groups.resolve(1), None);
    }

    #[test]
    fn test_classify_skips_exact_match() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "1")]);
        let importer = BatchImporter::default();
        let record = importer.parse(&doc).unwrap().records.remove(0);

        let existing = SharedParameter {
            id: "12".to_string(),
            name: "Fire Rating".to_string(),
            guid: Uuid::new_v4(),
            data_type: "TEXT".to_string(),
            group: "Identity Data".to_string(),
            description: String::new(),
            visible: "1".to_string(),
            user_modifiable: "1".to_string(),
            batch_id: None,
            author: None,
            collections: Vec::new(),
        };
        assert_eq!(
            importer.classify(&record, &[existing.clone()], is_exact_match),
            ImportDecision::Skip
        );

        let other_group = SharedParameter {
            group: "Dimensions".to_string(),
            ..existing
        };
        assert_eq!(
            importer.classify(&record, &[other_group], is_exact_match),
            ImportDecision::Create
        );
        assert_eq!(
            importer.classify::<SharedParameter, _>(&record, &[], is_exact_match),
            ImportDecision::Create
        );
    }

    #[test]
    fn test_classify_uses_custom_predicate() {
        let doc = document(&[param(GUID_A, "Fire Rating", "TEXT", "1")]);
        let importer = BatchImporter::default();
        let record = importer.parse(&doc).unwrap().records.remove(0);

        let by_guid = |r: &ImportRecord, guid: &Uuid| r.guid == *guid;
        let known = [Uuid::parse_str(GUID_A).unwrap()];
        assert_eq!(importer.classify(&record, &known, by_guid), ImportDecision::Skip);
    }
}
