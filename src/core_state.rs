//! Application state for the capture / check / save workflow.
//!
//! `PlateForm` holds what the user is currently editing, `CoreState` owns
//! it together with the plate database and the OCR engine. Every handler
//! goes through `CoreState`, so there is no free-floating mutable state.

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::Plate;
use crate::pipeline::extraction::{self, ExtractionError, OcrEngine};

/// File name sent to the OCR provider with each capture.
const CAPTURE_FILE_NAME: &str = "plate.jpg";

// ═══════════════════════════════════════════════════════════
// PlateForm — the single editable record
// ═══════════════════════════════════════════════════════════

/// Form state: current plate text, attached image, and which saved plate
/// (if any) is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlateForm {
    pub plate: String,
    pub image: Option<String>,
    pub editing_id: Option<Uuid>,
}

impl PlateForm {
    pub fn set_plate(&mut self, plate: impl Into<String>) {
        self.plate = plate.into();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.image = image;
    }

    /// Load a saved plate into the form; the next submit updates it.
    pub fn begin_edit(&mut self, plate: &Plate) {
        self.plate = plate.number.clone();
        self.image = plate.image.clone();
        self.editing_id = Some(plate.id);
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ═══════════════════════════════════════════════════════════
// Outcomes
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A plate-shaped candidate was found and written into the form.
    Recognized(String),
    /// OCR returned text, but nothing plate-shaped.
    NotRecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Exists,
    NotFound,
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    conn: Mutex<Connection>,
    form: Mutex<PlateForm>,
    ocr: Option<Box<dyn OcrEngine>>,
}

impl CoreState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            form: Mutex::new(PlateForm::default()),
            ocr: None,
        }
    }

    /// Attach the OCR engine used by [`CoreState::capture`].
    pub fn with_ocr(mut self, ocr: Box<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::LockPoisoned)
    }

    fn form_mut(&self) -> Result<MutexGuard<'_, PlateForm>, CoreError> {
        self.form.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Snapshot of the current form.
    pub fn form(&self) -> Result<PlateForm, CoreError> {
        Ok(self.form_mut()?.clone())
    }

    /// Manual entry into the plate field.
    pub fn set_plate_input(&self, plate: &str) -> Result<(), CoreError> {
        self.form_mut()?.set_plate(plate);
        Ok(())
    }

    pub fn set_image_input(&self, image: Option<String>) -> Result<(), CoreError> {
        self.form_mut()?.set_image(image);
        Ok(())
    }

    /// Run OCR on a captured image and fill the form on success.
    ///
    /// The image reference is attached either way; the plate field is only
    /// overwritten when a candidate is found.
    pub fn capture(
        &self,
        image_bytes: &[u8],
        image_ref: Option<String>,
    ) -> Result<CaptureOutcome, CoreError> {
        let ocr = self.ocr.as_ref().ok_or_else(|| {
            ExtractionError::NotConfigured("no OCR engine attached".into())
        })?;
        let response = ocr.recognize_image(image_bytes, CAPTURE_FILE_NAME)?;
        let candidate = extraction::process(response.first_text());

        let mut form = self.form_mut()?;
        form.set_image(image_ref);
        match candidate {
            Some(candidate) => {
                tracing::info!(plate = %candidate, "Plate recognized");
                form.set_plate(candidate.text.clone());
                Ok(CaptureOutcome::Recognized(candidate.text))
            }
            None => {
                tracing::warn!("No plate recognized in OCR text");
                Ok(CaptureOutcome::NotRecognized)
            }
        }
    }

    /// Is the form's current plate already saved?
    pub fn check_current(&self) -> Result<CheckOutcome, CoreError> {
        let plate = self.form_mut()?.plate.clone();
        let conn = self.conn()?;
        let known = db::known_plate_numbers(&conn)?;
        Ok(if extraction::check(&plate, &known) {
            CheckOutcome::Exists
        } else {
            CheckOutcome::NotFound
        })
    }

    /// Save the form: update the plate being edited, or add a new one.
    /// Empty plate text is a no-op. The form is reset after a save.
    pub fn submit(&self) -> Result<Option<Plate>, CoreError> {
        let mut form = self.form_mut()?;
        if form.plate.is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;
        let saved = match form.editing_id {
            Some(id) => {
                db::update_plate(&conn, &id, &form.plate, form.image.as_deref())?;
                tracing::info!(%id, "Plate updated");
                db::get_plate(&conn, &id)?
            }
            None => {
                let plate = Plate::new(form.plate.clone(), form.image.clone());
                db::insert_plate(&conn, &plate)?;
                tracing::info!(id = %plate.id, "Plate added");
                Some(plate)
            }
        };

        form.reset();
        Ok(saved)
    }

    /// Load a saved plate into the form for editing.
    pub fn edit(&self, id: &Uuid) -> Result<Plate, CoreError> {
        let plate = {
            let conn = self.conn()?;
            db::get_plate(&conn, id)?
        }
        .ok_or_else(|| {
            CoreError::Database(DatabaseError::NotFound {
                entity_type: "plate".into(),
                id: id.to_string(),
            })
        })?;
        self.form_mut()?.begin_edit(&plate);
        Ok(plate)
    }

    /// Delete a saved plate. If it was being edited, the form is cleared.
    pub fn delete(&self, id: &Uuid) -> Result<(), CoreError> {
        {
            let conn = self.conn()?;
            db::delete_plate(&conn, id)?;
        }
        let mut form = self.form_mut()?;
        if form.editing_id == Some(*id) {
            form.reset();
        }
        Ok(())
    }

    /// Saved plates, newest first.
    pub fn plates(&self) -> Result<Vec<Plate>, CoreError> {
        let conn = self.conn()?;
        Ok(db::list_plates(&conn)?)
    }

    /// Seed demo plates into an empty store.
    pub fn seed_samples(&self) -> Result<usize, CoreError> {
        let conn = self.conn()?;
        Ok(db::seed_sample_plates_if_empty(&conn)?)
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}
