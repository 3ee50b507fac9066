//! Upload form validation and the submit flow that ends in `AddFile`.

use super::schema::{FilesState, StoredFile, UploadProgress};
use super::selectors;
use super::store::{DuplicateFile, Store};
use super::upload::{FileSource, UploadError, UploadSimulator};
use super::validation::{is_valid_json_file, ValidationRules};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileFieldError {
    #[error("Please select a file.")]
    Required,
    #[error("Only .json files are allowed.")]
    InvalidExtension,
    #[error("A file with the name \"{0}\" already exists. Please choose a different file.")]
    Duplicate(String),
    #[error("{0}")]
    Upload(UploadError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameFieldError {
    #[error("Name is required.")]
    Required,
    #[error("Name must be 1-32 letters, digits, '_' or '-' and contain \"{marker}\".")]
    Pattern { marker: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionFieldError {
    #[error("Description is required.")]
    Required,
    #[error("Description must be at most {max} characters (got {actual}).")]
    MaxLength { max: usize, actual: usize },
    #[error("Description must not contain \"{marker}\".")]
    Forbidden { marker: String },
}

/// Field-level errors of one submission. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("upload form is invalid")]
pub struct FormErrors {
    pub file: Option<FileFieldError>,
    pub name: Option<NameFieldError>,
    pub description: Option<DescriptionFieldError>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.name.is_none() && self.description.is_none()
    }

    fn file(error: FileFieldError) -> Self {
        Self {
            file: Some(error),
            ..Self::default()
        }
    }

    /// `(field, message)` pairs for display.
    pub fn messages(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(e) = &self.file {
            out.push(("file", e.to_string()));
        }
        if let Some(e) = &self.name {
            out.push(("name", e.to_string()));
        }
        if let Some(e) = &self.description {
            out.push(("description", e.to_string()));
        }
        out
    }
}

/// Values of the upload form. Every field may still be unset.
pub struct UploadForm<S> {
    pub file: Option<S>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl<S: FileSource> UploadForm<S> {
    pub fn new(file: S, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            file: Some(file),
            name: Some(name.into()),
            description: Some(description.into()),
        }
    }
}

/// Validates submissions, runs the upload and stores the result.
#[derive(Debug, Clone)]
pub struct UploadFlow {
    rules: ValidationRules,
    simulator: UploadSimulator,
}

impl UploadFlow {
    pub fn new(rules: ValidationRules, simulator: UploadSimulator) -> Self {
        Self { rules, simulator }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Field rules first; the duplicate check only runs on an otherwise valid form.
    pub fn validate<S: FileSource>(
        &self,
        form: &UploadForm<S>,
        state: &FilesState,
    ) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        errors.file = match &form.file {
            None => Some(FileFieldError::Required),
            Some(f) if !is_valid_json_file(f.name()) => Some(FileFieldError::InvalidExtension),
            Some(_) => None,
        };

        errors.name = match form.name.as_deref() {
            None | Some("") => Some(NameFieldError::Required),
            Some(n) if !self.rules.is_valid_name(n) => Some(NameFieldError::Pattern {
                marker: self.rules.marker().to_string(),
            }),
            Some(_) => None,
        };

        errors.description = match form.description.as_deref() {
            None | Some("") => Some(DescriptionFieldError::Required),
            Some(d) => {
                let actual = d.encode_utf16().count();
                let max = self.rules.description_max_len();
                if actual > max {
                    Some(DescriptionFieldError::MaxLength { max, actual })
                } else if self.rules.validate_description(Some(d)).is_err() {
                    Some(DescriptionFieldError::Forbidden {
                        marker: self.rules.marker().to_string(),
                    })
                } else {
                    None
                }
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        if let Some(f) = &form.file {
            if selectors::exists(state, f.name()) {
                return Err(FormErrors::file(FileFieldError::Duplicate(
                    f.name().to_string(),
                )));
            }
        }
        Ok(())
    }

    /// Runs the whole submission. Nothing is dispatched unless the upload completes.
    pub async fn submit<S>(
        &self,
        store: &mut Store,
        form: UploadForm<S>,
        on_progress: impl FnMut(&UploadProgress),
    ) -> Result<StoredFile, FormErrors>
    where
        S: FileSource + 'static,
    {
        self.validate(&form, &store.snapshot())?;
        let UploadForm {
            file: Some(file),
            name: Some(title),
            description: Some(description),
        } = form
        else {
            return Err(FormErrors::file(FileFieldError::Required));
        };

        let file_name = file.name().to_string();
        let content = self
            .simulator
            .upload(file)
            .finish(on_progress)
            .await
            .map_err(|e| FormErrors::file(FileFieldError::Upload(e)))?;

        let item = StoredFile {
            valid: !self.rules.is_flagged_invalid(&description),
            file_name,
            title,
            description,
            content,
        };
        store
            .add_file(item.clone())
            .map_err(|DuplicateFile(name)| FormErrors::file(FileFieldError::Duplicate(name)))?;
        info!(file = %item.file_name, valid = item.valid, "file uploaded");
        Ok(item)
    }
}
