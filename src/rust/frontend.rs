//! Request handling for the single classification page.
//!
//! The HTTP server and HTML templates live outside this crate; they translate
//! a request into a [`FormRequest`] and render the returned [`PageView`].

use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::{ClassificationView, Classifier, ClassifierError, Label, IDLE_COLOR};

/// Name of the form field carrying the text to classify
pub const TEXT_FIELD: &str = "text";
/// Color of the page when classification failed
pub const FAILURE_COLOR: &str = "red";
/// Message shown instead of a label when classification failed
pub const FAILURE_MESSAGE: &str = "The text could not be classified.";

#[derive(Debug, Clone)]
pub enum FormRequest {
    /// Render the empty form
    Get,
    /// Submitted form fields as raw bytes, before any decoding
    Post(HashMap<String, Vec<u8>>),
}

/// Everything the page template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub view: ClassificationView,
    /// Generic failure message, set instead of a label
    pub error: Option<String>,
    /// HTTP status the surrounding server should answer with
    pub status: u16,
}

impl PageView {
    fn idle() -> Self {
        Self::labeled(ClassificationView {
            text: String::new(),
            label: Label::default(),
            render_color: IDLE_COLOR.to_string(),
        })
    }

    fn labeled(view: ClassificationView) -> Self {
        Self {
            view,
            error: None,
            status: 200,
        }
    }

    /// The generic failure page. Bad input is the client's fault (400);
    /// anything else is a server-side failure (500).
    fn failed(text: String, err: &ClassifierError) -> Self {
        let status = match err {
            ClassifierError::InputError(_) => 400,
            _ => 500,
        };
        Self {
            view: ClassificationView {
                text,
                label: Label::default(),
                render_color: FAILURE_COLOR.to_string(),
            },
            error: Some(FAILURE_MESSAGE.to_string()),
            status,
        }
    }
}

/// Serves one request against the classifier.
///
/// A POST without a `text` field, or with one that is not valid UTF-8, is an
/// input error. Any pipeline error yields the generic failure page; the
/// default label is never used to hide one.
pub fn handle(classifier: &Classifier, request: FormRequest) -> PageView {
    let bytes = match request {
        FormRequest::Get => return PageView::idle(),
        FormRequest::Post(mut fields) => match fields.remove(TEXT_FIELD) {
            Some(bytes) => bytes,
            None => {
                let err = ClassifierError::InputError(format!("Missing form field '{}'", TEXT_FIELD));
                warn!("Rejected request: {}", err);
                return PageView::failed(String::new(), &err);
            }
        },
    };

    match classifier.render_bytes(&bytes) {
        Ok(view) => PageView::labeled(view),
        Err(e) => {
            warn!("Classification failed: {}", e);
            PageView::failed(String::from_utf8_lossy(&bytes).into_owned(), &e)
        }
    }
}
