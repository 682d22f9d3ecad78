use echolink_core::{EchoLinkError, EchoLinkResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Everything known about one professional, merged from all their rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionalRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub training: String,
    pub product_used: String,
    pub recommendation: String,
    pub feedback: String,
    pub training_completed: Vec<String>,
    pub training_in_progress: Vec<String>,
    pub training_not_started: Vec<String>,
}

/// One flat row as exported from the training dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DatasetRow {
    pub user_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub training: Option<String>,
    #[serde(default)]
    pub product_name_used: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub training_completed: Option<String>,
    #[serde(default)]
    pub training_in_progress: Option<String>,
    #[serde(default)]
    pub training_not_started: Option<String>,
}

/// Lookup of professional records.
pub trait RecordStore: Send + Sync {
    /// Case-insensitive match on the user id or the email column.
    fn find_by_email(&self, email: &str) -> Option<ProfessionalRecord>;
}

/// Records loaded from a dataset export: a JSON array of rows, or a CSV
/// file with the same column headers.
#[derive(Debug, Default)]
pub struct DatasetRecordStore {
    records: HashMap<String, ProfessionalRecord>,
}

impl DatasetRecordStore {
    pub async fn load(path: &Path) -> EchoLinkResult<Self> {
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            EchoLinkError::Dataset(format!("cannot read {}: {e}", path.display()))
        })?;
        let rows = if is_csv(path) {
            parse_csv(&data)
        } else {
            serde_json::from_str(&data).map_err(|e| e.to_string())
        }
        .map_err(|e| EchoLinkError::Dataset(format!("invalid dataset {}: {e}", path.display())))?;
        let store = Self::from_rows(rows);
        info!(path = %path.display(), professionals = store.len(), "Dataset loaded");
        Ok(store)
    }

    /// Group rows by lower-cased user id. Scalar columns come from the first
    /// row seen; training columns are collected without duplicates.
    pub fn from_rows(rows: Vec<DatasetRow>) -> Self {
        let mut records: HashMap<String, ProfessionalRecord> = HashMap::new();

        for row in rows {
            let key = row.user_id.trim().to_lowercase();
            let record = records.entry(key.clone()).or_insert_with(|| ProfessionalRecord {
                user_id: key,
                first_name: text(&row.first_name),
                last_name: text(&row.last_name),
                email: text(&row.email).to_lowercase(),
                training: text(&row.training),
                product_used: text(&row.product_name_used),
                recommendation: text(&row.recommendation),
                feedback: text(&row.feedback),
                training_completed: Vec::new(),
                training_in_progress: Vec::new(),
                training_not_started: Vec::new(),
            });

            push_unique(&mut record.training_completed, &row.training_completed);
            push_unique(&mut record.training_in_progress, &row.training_in_progress);
            push_unique(&mut record.training_not_started, &row.training_not_started);
        }

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for DatasetRecordStore {
    fn find_by_email(&self, email: &str) -> Option<ProfessionalRecord> {
        let needle = email.trim().to_lowercase();
        self.records.get(&needle).cloned().or_else(|| {
            self.records
                .values()
                .find(|r| !r.email.is_empty() && r.email == needle)
                .cloned()
        })
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Header row required; empty cells read as missing.
fn parse_csv(data: &str) -> Result<Vec<DatasetRow>, String> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes())
        .deserialize()
        .collect::<Result<Vec<DatasetRow>, csv::Error>>()
        .map_err(|e| e.to_string())
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn push_unique(list: &mut Vec<String>, value: &Option<String>) {
    let value = text(value);
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}
