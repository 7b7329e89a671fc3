use crate::api::ApiReply;
use crate::errors::{ClientError, ClientResult, ValidationError};
use crate::state::AppState;
use crate::ui::{LoadingIndicator, LOGIN_LOCATION, POST_LOGIN_LOCATION, messages};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Failure,
}

#[derive(Debug, Clone, Default)]
pub struct LoginFields {
    pub username: String,
    pub senha: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterFields {
    pub username: String,
    pub email: String,
    pub senha: String,
    pub confirmar_senha: String,
}

pub struct LoginForm {
    state: AppState,
    pub fields: LoginFields,
    phase: FormPhase,
}

impl LoginForm {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            fields: LoginFields::default(),
            phase: FormPhase::Idle,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Submits the current fields. On success the returned user is stored in
    /// the session and the page navigates away; on failure the fields stay
    /// as typed.
    pub async fn submit(&mut self) -> ClientResult<String> {
        self.phase = FormPhase::Submitting;
        let result = self.attempt().await;
        self.phase = match &result {
            Ok(_) => FormPhase::Success,
            Err(_) => FormPhase::Failure,
        };
        result
    }

    async fn attempt(&self) -> ClientResult<String> {
        let surface = self.state.surface();
        let username = self.fields.username.trim();

        let reply = {
            let _indicator = LoadingIndicator::show(surface, messages::CONNECTING);
            self.state.api.login(username, &self.fields.senha).await
        };

        match reply {
            Ok(ApiReply::Success(user)) => {
                if let Err(err) = self.state.session.sign_in(&user).await {
                    surface.alert(&format!("Could not store session: {err}"));
                    return Err(err);
                }
                surface.alert(&messages::welcome(&user));
                info!("logged in as {user}");
                surface.navigate(POST_LOGIN_LOCATION);
                Ok(user)
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                warn!("login rejected ({status})");
                surface.alert(&err.user_message(messages::LOGIN_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface, &err, messages::LOGIN_TIMEOUT);
                Err(err)
            }
        }
    }
}

pub struct RegisterForm {
    state: AppState,
    pub fields: RegisterFields,
    phase: FormPhase,
}

impl RegisterForm {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            fields: RegisterFields::default(),
            phase: FormPhase::Idle,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub async fn submit(&mut self) -> ClientResult<()> {
        self.phase = FormPhase::Submitting;
        let result = self.attempt().await;
        self.phase = match &result {
            Ok(()) => FormPhase::Success,
            Err(_) => FormPhase::Failure,
        };
        result
    }

    async fn attempt(&self) -> ClientResult<()> {
        let surface = self.state.surface();
        let (username, email) = match validate_registration(&self.fields) {
            Ok(fields) => fields,
            Err(err) => {
                surface.alert(&err.to_string());
                return Err(err.into());
            }
        };

        match self.state.api.register(username, email, &self.fields.senha).await {
            Ok(ApiReply::Success(_)) => {
                info!("registered {username}");
                surface.alert(messages::REGISTERED);
                surface.navigate(LOGIN_LOCATION);
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::REGISTER_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface, &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }
}

/// Returns the trimmed username and email when every field is filled and
/// both passwords agree.
pub fn validate_registration(fields: &RegisterFields) -> Result<(&str, &str), ValidationError> {
    let username = fields.username.trim();
    let email = fields.email.trim();

    if username.is_empty()
        || email.is_empty()
        || fields.senha.is_empty()
        || fields.confirmar_senha.is_empty()
    {
        return Err(ValidationError::MissingFields);
    }
    if fields.senha != fields.confirmar_senha {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok((username, email))
}

/// Surfaces a transport-level failure, with the dedicated message on timeout.
pub(crate) fn report_request_error(
    surface: &dyn crate::ui::Surface,
    err: &ClientError,
    timeout_message: &str,
) {
    if err.is_timeout() {
        surface.alert(timeout_message);
    } else {
        surface.alert(&format!("Error communicating with the server: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(username: &str, email: &str, senha: &str, confirmar: &str) -> RegisterFields {
        RegisterFields {
            username: username.into(),
            email: email.into(),
            senha: senha.into(),
            confirmar_senha: confirmar.into(),
        }
    }

    #[test]
    fn registration_requires_every_field() {
        assert_eq!(
            validate_registration(&fields("  ", "a@b.com", "x", "x")),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_registration(&fields("ana", "a@b.com", "x", "")),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn registration_rejects_mismatched_passwords() {
        assert_eq!(
            validate_registration(&fields("ana", "a@b.com", "x", "y")),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn registration_trims_identity_fields() {
        let input = fields(" ana ", " a@b.com ", "pw", "pw");
        assert_eq!(validate_registration(&input), Ok(("ana", "a@b.com")));
    }
}
