use crate::api::ApiReply;
use crate::auth::report_request_error;
use crate::errors::{ClientError, ClientResult, ValidationError};
use crate::state::AppState;
use crate::ui::messages;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::info;

pub const SECURITY_PHRASE: &str = "alohomora";

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResetField {
    Email,
    ConfirmPassword,
    SecurityPhrase,
}

impl ResetField {
    pub fn message(self) -> &'static str {
        match self {
            Self::Email => "Enter a valid email address.",
            Self::ConfirmPassword => "Passwords do not match.",
            Self::SecurityPhrase => "Incorrect security phrase.",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetFields {
    pub email: String,
    pub nova_senha: String,
    pub confirmar_senha: String,
    pub key_phrase: String,
}

/// Password reset form with per-field inline errors.
pub struct PasswordResetForm {
    state: AppState,
    fields: ResetFields,
    visible_errors: BTreeSet<ResetField>,
}

impl PasswordResetForm {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            fields: ResetFields::default(),
            visible_errors: BTreeSet::new(),
        }
    }

    pub fn visible_errors(&self) -> Vec<ResetField> {
        self.visible_errors.iter().copied().collect()
    }

    /// New input in a field hides that field's error.
    pub fn input(&mut self, field: ResetField, value: &str) {
        match field {
            ResetField::Email => self.fields.email = value.to_string(),
            ResetField::ConfirmPassword => self.fields.confirmar_senha = value.to_string(),
            ResetField::SecurityPhrase => self.fields.key_phrase = value.to_string(),
        }
        self.visible_errors.remove(&field);
    }

    pub fn set_new_password(&mut self, value: &str) {
        self.fields.nova_senha = value.to_string();
    }

    /// Runs every check and reveals the error of each failing field.
    /// Returns whether the form may be submitted.
    pub fn validate(&mut self) -> bool {
        let failing = check_fields(&self.fields);
        self.visible_errors.extend(failing.iter().copied());
        failing.is_empty()
    }

    /// Validates, then posts the reset when every check passes.
    pub async fn submit(&mut self) -> ClientResult<()> {
        if !self.validate() {
            return Err(ValidationError::ResetForm(self.visible_errors.len()).into());
        }

        let surface = self.state.surface();
        let email = self.fields.email.trim();
        let phrase = self.fields.key_phrase.trim().to_lowercase();
        match self
            .state
            .api
            .reset_password(email, &self.fields.nova_senha, &phrase)
            .await
        {
            Ok(ApiReply::Success(_)) => {
                info!("password reset for {email}");
                surface.alert(messages::PASSWORD_RESET);
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::PASSWORD_RESET_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface, &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }
}

pub fn email_is_valid(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email.trim())
}

pub fn phrase_matches(phrase: &str) -> bool {
    phrase.trim().to_lowercase() == SECURITY_PHRASE
}

pub fn check_fields(fields: &ResetFields) -> Vec<ResetField> {
    let mut failing = Vec::new();
    if !email_is_valid(&fields.email) {
        failing.push(ResetField::Email);
    }
    if fields.nova_senha != fields.confirmar_senha {
        failing.push(ResetField::ConfirmPassword);
    }
    if !phrase_matches(&fields.key_phrase) {
        failing.push(ResetField::SecurityPhrase);
    }
    failing
}
