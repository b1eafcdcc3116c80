//! Per-dataset record accessors.
//!
//! Source files disagree on which column is the identifier, the display name
//! and the authority type. A [`FieldAdapter`] is resolved once per dataset
//! against its header row and shared by every record of that dataset, so the
//! rest of the engine only ever sees `id / name / local_type / dataset_tag`.

use std::fmt::Debug;

use crate::config::{field_key, DatasetConfig};
use crate::error::LinkageError;

/// Capability interface every record goes through.
pub trait RecordAccessor: Debug + Send + Sync {
    fn id<'r>(&self, fields: &'r [String]) -> &'r str;
    fn name<'r>(&self, fields: &'r [String]) -> &'r str;
    /// Trimmed type label; `None` when the dataset has no type field or the
    /// value is blank.
    fn local_type<'r>(&self, fields: &'r [String]) -> Option<&'r str>;
    fn dataset_tag(&self) -> &str;
    /// Any other field by name, for presentation extras such as links.
    fn field<'r>(&self, fields: &'r [String], name: &str) -> Option<&'r str>;
}

/// Column positions resolved from a dataset descriptor.
#[derive(Debug, Clone)]
pub struct FieldAdapter {
    dataset: String,
    tag: String,
    headers: Vec<String>,
    id: usize,
    name: usize,
    local_type: Option<usize>,
}

impl FieldAdapter {
    /// Resolve `dataset.fields` against a header row.
    ///
    /// Fails with `MissingDescriptorField` when the descriptor (or a
    /// `require` entry) names a column the source lacks.
    pub fn resolve(dataset: &DatasetConfig, headers: &[String]) -> Result<Self, LinkageError> {
        let headers: Vec<String> = headers.iter().map(|h| field_key(h)).collect();

        let idx = |field: &str| -> Result<usize, LinkageError> {
            let key = field_key(field);
            headers.iter().position(|h| *h == key).ok_or_else(|| {
                LinkageError::MissingDescriptorField {
                    dataset: dataset.name.clone(),
                    field: field.into(),
                }
            })
        };

        let id = idx(&dataset.fields.id)?;
        let name = idx(&dataset.fields.name)?;
        let local_type = match dataset.fields.local_type {
            Some(ref field) => Some(idx(field)?),
            None => None,
        };
        for field in dataset.require.iter().chain(dataset.link_field.iter()) {
            idx(field)?;
        }

        Ok(Self {
            dataset: dataset.name.clone(),
            tag: dataset.tag(),
            headers,
            id,
            name,
            local_type,
        })
    }

    /// Adapter for rows laid out as `[id, name]` or `[id, name, type]`.
    pub fn positional(dataset: &str, tag: &str, typed: bool) -> Self {
        let mut headers = vec!["id".to_string(), "name".to_string()];
        if typed {
            headers.push("type".into());
        }
        Self {
            dataset: dataset.into(),
            tag: tag.into(),
            headers,
            id: 0,
            name: 1,
            local_type: typed.then_some(2),
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        let key = field_key(field);
        self.headers.iter().position(|h| *h == key)
    }
}

fn cell(fields: &[String], idx: usize) -> &str {
    fields.get(idx).map(String::as_str).unwrap_or("")
}

impl RecordAccessor for FieldAdapter {
    fn id<'r>(&self, fields: &'r [String]) -> &'r str {
        cell(fields, self.id)
    }

    fn name<'r>(&self, fields: &'r [String]) -> &'r str {
        cell(fields, self.name)
    }

    fn local_type<'r>(&self, fields: &'r [String]) -> Option<&'r str> {
        let value = cell(fields, self.local_type?).trim();
        (!value.is_empty()).then_some(value)
    }

    fn dataset_tag(&self) -> &str {
        &self.tag
    }

    fn field<'r>(&self, fields: &'r [String], name: &str) -> Option<&'r str> {
        self.index_of(name).and_then(|i| fields.get(i)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldDescriptor;

    fn dataset(id: &str, name: &str, local_type: Option<&str>) -> DatasetConfig {
        DatasetConfig {
            name: "local-directgov".into(),
            kind: None,
            file: "directgov.tsv".into(),
            delimiter: "\t".into(),
            fields: FieldDescriptor {
                id: id.into(),
                name: name.into(),
                local_type: local_type.map(Into::into),
            },
            require: Vec::new(),
            cluster: true,
            report: true,
            link_field: None,
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_descriptor_against_headers() {
        let ds = dataset("snac", "name", Some("tier"));
        let adapter =
            FieldAdapter::resolve(&ds, &headers(&["Name", "SNAC", "Tier", "url"])).unwrap();
        let fields = row(&["Wealden District Council", "21UH", " district ", "http://x"]);

        assert_eq!(adapter.id(&fields), "21UH");
        assert_eq!(adapter.name(&fields), "Wealden District Council");
        assert_eq!(adapter.local_type(&fields), Some("district"));
        assert_eq!(adapter.dataset(), "local-directgov");
        assert_eq!(adapter.dataset_tag(), "localdirectgov");
        assert_eq!(adapter.field(&fields, "URL"), Some("http://x"));
    }

    #[test]
    fn descriptor_fields_fold_to_snake_case() {
        let ds = dataset("local-authority", "name", Some("local-authority-type"));
        let adapter = FieldAdapter::resolve(
            &ds,
            &headers(&["local-authority", "name", "local-authority-type"]),
        )
        .unwrap();
        assert_eq!(adapter.headers()[2], "local_authority_type");
        assert_eq!(adapter.index_of("Local Authority Type"), Some(2));
    }

    #[test]
    fn missing_descriptor_field_is_fatal() {
        let ds = dataset("ons_code", "name", None);
        let err = FieldAdapter::resolve(&ds, &headers(&["name", "snac"])).unwrap_err();
        match err {
            LinkageError::MissingDescriptorField { dataset, field } => {
                assert_eq!(dataset, "local-directgov");
                assert_eq!(field, "ons_code");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_required_field_is_fatal() {
        let mut ds = dataset("snac", "name", None);
        ds.require = vec!["ons_code".into()];
        let err = FieldAdapter::resolve(&ds, &headers(&["name", "snac"])).unwrap_err();
        assert!(err.to_string().contains("missing field 'ons_code'"));
    }

    #[test]
    fn untyped_dataset_has_no_type() {
        let ds = dataset("snac", "name", None);
        let adapter = FieldAdapter::resolve(&ds, &headers(&["name", "snac"])).unwrap();
        assert_eq!(adapter.local_type(&row(&["Kent", "29"])), None);
    }

    #[test]
    fn blank_type_is_absent_and_short_rows_read_empty() {
        let adapter = FieldAdapter::positional("legislation", "legislation", true);
        assert_eq!(adapter.local_type(&row(&["E1", "Kent", "   "])), None);
        assert_eq!(adapter.local_type(&row(&["E1"])), None);
        assert_eq!(adapter.name(&row(&["E1"])), "");
    }
}
