//! Create-Request Wizard
//!
//! `Input -> Summary -> Done`. Free text goes to the AI endpoint, the
//! returned draft is confirmed together with how much the requester can
//! afford, and only then is the request created. There is no path from
//! `Input` straight to `Done`.

use crate::error::ValidationError;
use crate::models::{CreateRequestPayload, Draft, InvokeAiPayload, LatLng};

/// Longest description the API accepts
pub const MAX_TEXT_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Input,
    Summary,
    Done,
}

impl WizardStep {
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Input => "Request help",
            WizardStep::Summary => "Confirm request",
            WizardStep::Done => "Request submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateWizard {
    pub step: WizardStep,
    pub text: String,
    pub draft: Option<Draft>,
    /// Parser confidence reported with the draft
    pub confidence: f64,
    /// Raw text of the affordability field
    pub afford: String,
    pub in_flight: bool,
    pub error: Option<String>,
    pub location: LatLng,
}

/// Non-negative finite number; 0 means "cannot contribute"
pub fn parse_affordability(input: &str) -> Result<f64, ValidationError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAffordability)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidAffordability)
    }
}

impl CreateWizard {
    pub fn new(location: LatLng) -> Self {
        Self {
            step: WizardStep::Input,
            text: String::new(),
            draft: None,
            confidence: 0.0,
            afford: String::new(),
            in_flight: false,
            error: None,
            location,
        }
    }

    pub fn can_submit_text(&self) -> bool {
        self.step == WizardStep::Input && !self.in_flight && !self.text.trim().is_empty()
    }

    /// Authorize the AI parse call; None when the text cannot be sent
    pub fn begin_parse(&mut self) -> Option<InvokeAiPayload> {
        if !self.can_submit_text() {
            return None;
        }
        let text = self.text.trim();
        if text.chars().count() > MAX_TEXT_LEN {
            self.error = Some(ValidationError::TextTooLong { max: MAX_TEXT_LEN }.to_string());
            return None;
        }
        let payload = InvokeAiPayload {
            text: text.to_string(),
            location: self.location,
            requester_afford: 0.0,
        };
        self.in_flight = true;
        self.error = None;
        Some(payload)
    }

    pub fn parse_succeeded(&mut self, draft: Draft, confidence: f64) {
        if self.step != WizardStep::Input {
            return;
        }
        self.draft = Some(draft);
        self.confidence = confidence.clamp(0.0, 1.0);
        self.afford.clear();
        self.in_flight = false;
        self.step = WizardStep::Summary;
    }

    pub fn parse_failed(&mut self, message: String) {
        self.in_flight = false;
        self.error = Some(message);
    }

    /// Authorize the create call; None when there is no draft or the
    /// affordability field is invalid
    pub fn begin_submit(&mut self) -> Option<CreateRequestPayload> {
        if self.step != WizardStep::Summary || self.in_flight {
            return None;
        }
        let draft = self.draft.as_ref()?;
        let requester_afford = match parse_affordability(&self.afford) {
            Ok(value) => value,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };
        let payload = CreateRequestPayload {
            raw_text: self.text.trim().to_string(),
            category: draft.category,
            urgency_window: draft.urgency_window,
            severity: draft.severity,
            items: draft.items.clone(),
            estimated_total: draft.estimated_total,
            requester_afford,
            location: self.location,
        };
        self.in_flight = true;
        self.error = None;
        Some(payload)
    }

    pub fn submit_succeeded(&mut self) {
        if self.step != WizardStep::Summary {
            return;
        }
        self.in_flight = false;
        self.step = WizardStep::Done;
    }

    pub fn submit_failed(&mut self, message: String) {
        self.in_flight = false;
        self.error = Some(message);
    }
}
