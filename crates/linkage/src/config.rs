use std::collections::HashSet;

use serde::Deserialize;

use crate::error::LinkageError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LinkageConfig {
    pub name: String,
    /// Name of the dataset whose type vocabulary is treated as ground truth.
    pub reference: String,
    /// Ordered; the order is the column order of every output.
    pub datasets: Vec<DatasetConfig>,
    #[serde(default = "default_overrides")]
    pub overrides: Vec<AliasOverride>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// Entity kind the dataset tag is derived from. Defaults to `name`.
    #[serde(default)]
    pub kind: Option<String>,
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub fields: FieldDescriptor,
    /// Rows with a blank value in any of these fields are dropped on load.
    #[serde(default)]
    pub require: Vec<String>,
    /// Whether the collection takes part in clustering.
    #[serde(default = "default_true")]
    pub cluster: bool,
    /// Whether the collection gets a column in the report and export.
    #[serde(default = "default_true")]
    pub report: bool,
    /// Field rendered as an external link in the HTML report.
    #[serde(default)]
    pub link_field: Option<String>,
}

/// Which source fields play the id / name / type roles.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(default = "default_name_field")]
    pub name: String,
    #[serde(default, rename = "type")]
    pub local_type: Option<String>,
}

impl DatasetConfig {
    /// Dataset tag: the entity kind with separators removed, lower-cased.
    pub fn tag(&self) -> String {
        dataset_tag(self.kind.as_deref().unwrap_or(&self.name))
    }

    pub fn delimiter_byte(&self) -> Result<u8, LinkageError> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(LinkageError::ConfigValidation(format!(
                "dataset '{}': delimiter must be a single byte, got {:?}",
                self.name, self.delimiter
            ))),
        }
    }
}

/// `local-authority` → `localauthority`.
pub fn dataset_tag(kind: &str) -> String {
    kind.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Header / descriptor field names compare in snake case:
/// `Local-Authority Type` → `local_authority_type`.
pub fn field_key(field: &str) -> String {
    field.trim().to_lowercase().replace(['-', ' '], "_")
}

fn default_delimiter() -> String {
    "\t".into()
}

fn default_name_field() -> String {
    "name".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Overrides + Output
// ---------------------------------------------------------------------------

/// A type alias forced after inference, keyed by dataset tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AliasOverride {
    pub dataset: String,
    pub local_type: String,
    pub category: String,
}

impl AliasOverride {
    pub fn new(dataset: &str, local_type: &str, category: &str) -> Self {
        Self {
            dataset: dataset.into(),
            local_type: local_type.into(),
            category: category.into(),
        }
    }
}

/// The two corrections inference cannot find on its own.
pub fn default_overrides() -> Vec<AliasOverride> {
    vec![
        AliasOverride::new("localauthority", "district", "district"),
        AliasOverride::new("legislation", "Local Government District", "district"),
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub tsv: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LinkageConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkageError> {
        let config: LinkageConfig =
            toml::from_str(input).map_err(|e| LinkageError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkageError> {
        if self.datasets.is_empty() {
            return Err(LinkageError::ConfigValidation(
                "at least one dataset is required".into(),
            ));
        }

        let mut names = HashSet::new();
        let mut tags = HashSet::new();
        for ds in &self.datasets {
            if !names.insert(ds.name.as_str()) {
                return Err(LinkageError::ConfigValidation(format!(
                    "duplicate dataset name '{}'",
                    ds.name
                )));
            }
            let tag = ds.tag();
            if tag.is_empty() {
                return Err(LinkageError::ConfigValidation(format!(
                    "dataset '{}': tag is empty",
                    ds.name
                )));
            }
            if !tags.insert(tag.clone()) {
                return Err(LinkageError::ConfigValidation(format!(
                    "dataset '{}': tag '{tag}' is already used by another dataset",
                    ds.name
                )));
            }
            if ds.fields.id.trim().is_empty() {
                return Err(LinkageError::ConfigValidation(format!(
                    "dataset '{}': fields.id is empty",
                    ds.name
                )));
            }
            ds.delimiter_byte()?;
        }

        let reference = self.reference_dataset().ok_or_else(|| {
            LinkageError::ConfigValidation(format!(
                "reference dataset '{}' not found",
                self.reference
            ))
        })?;
        if !reference.cluster {
            return Err(LinkageError::ConfigValidation(format!(
                "reference dataset '{}' is excluded from clustering",
                self.reference
            )));
        }

        Ok(())
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn reference_dataset(&self) -> Option<&DatasetConfig> {
        self.dataset(&self.reference)
    }

    /// Tag of the reference dataset. Only meaningful on a validated config.
    pub fn reference_tag(&self) -> String {
        self.reference_dataset()
            .map(DatasetConfig::tag)
            .unwrap_or_else(|| dataset_tag(&self.reference))
    }

    /// Datasets that get a column in the report and export, in config order.
    pub fn reported(&self) -> impl Iterator<Item = &DatasetConfig> {
        self.datasets.iter().filter(|d| d.report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
