use crate::api::ApiReply;
use crate::auth::report_request_error;
use crate::download::save_download;
use crate::errors::{ClientError, ClientResult, ValidationError};
use crate::modal::{Key, KeyOutcome, Modal};
use crate::models::PontoRecord;
use crate::state::AppState;
use crate::ui::messages;
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use std::path::PathBuf;
use tracing::{info, warn};

const FOCUSABLE: [&str; 5] = [
    "ponto_data",
    "ponto_entrada",
    "ponto_saida",
    "registrar_ponto",
    "exportar_ponto",
];

/// Field values of the time-clock popup, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PontoForm {
    pub usuario: String,
    pub data: String,
    pub max_data: String,
    pub entrada: String,
    pub saida: String,
}

pub struct PontoManager {
    state: AppState,
    popup: Modal,
    pub form: PontoForm,
}

impl PontoManager {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            popup: Modal::new("ponto"),
            form: PontoForm::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.popup.is_open()
    }

    pub fn popup(&self) -> &Modal {
        &self.popup
    }

    pub async fn open(&mut self) -> ClientResult<()> {
        self.open_at(Local::now().date_naive()).await
    }

    /// Opens the popup for the logged-in user with the date set to `today`.
    pub async fn open_at(&mut self, today: NaiveDate) -> ClientResult<()> {
        let Some(usuario) = self.state.session.current_user().await else {
            self.state.surface.alert(&ValidationError::NotLoggedIn.to_string());
            return Err(ValidationError::NotLoggedIn.into());
        };

        let today = today.format("%Y-%m-%d").to_string();
        self.form.usuario = usuario;
        self.form.data = today.clone();
        self.form.max_data = today;
        self.popup.open(FOCUSABLE.iter().map(|id| id.to_string()).collect());
        Ok(())
    }

    pub fn close(&mut self) {
        self.popup.close();
        self.form.entrada.clear();
        self.form.saida.clear();
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.popup.handle_key(key);
        if outcome == KeyOutcome::CloseRequested {
            self.close();
        }
        outcome
    }

    pub async fn submit(&mut self) -> ClientResult<()> {
        self.submit_at(Local::now().date_naive()).await
    }

    pub async fn submit_at(&mut self, today: NaiveDate) -> ClientResult<()> {
        let surface = self.state.surface.clone();
        let record = match validate_at(&self.form, today) {
            Ok(record) => record,
            Err(err) => {
                surface.alert(&err.to_string());
                return Err(err.into());
            }
        };

        match self.state.api.submit_ponto(&record).await {
            Ok(ApiReply::Success(_)) => {
                info!("recorded ponto for {} on {}", record.usuario, record.data);
                surface.alert(messages::PONTO_RECORDED);
                self.close();
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                let fallback = format!("{} (status {status})", messages::PONTO_FAILED);
                surface.alert(&err.user_message(&fallback));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface.as_ref(), &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }

    /// Downloads the user's records and saves them as `ponto_<usuario>.csv`.
    pub async fn export(&self) -> ClientResult<PathBuf> {
        let surface = self.state.surface();
        let usuario = match self.state.session.current_user().await {
            Some(usuario) if !usuario.is_empty() => usuario,
            _ => {
                surface.alert(&ValidationError::NotLoggedIn.to_string());
                return Err(ValidationError::NotLoggedIn.into());
            }
        };

        let reply = match self.state.api.export_ponto(&usuario).await {
            Ok(reply) => reply,
            Err(err) => {
                report_request_error(surface, &err, messages::TIMEOUT);
                return Err(err);
            }
        };

        if !reply.status.is_success() {
            let status = reply.status.as_u16();
            let text = reply.text();
            let detail = if text.trim().is_empty() {
                format!("status {status}")
            } else {
                text
            };
            warn!("ponto export failed with status {status}");
            surface.alert(&format!("{}: {detail}", messages::EXPORT_FAILED));
            return Err(ClientError::application(status, Some(detail)));
        }

        save_download(
            &self.state.download_dir,
            &format!("ponto_{usuario}.csv"),
            &reply.bytes,
        )
        .await
    }
}

/// Checks the form in order, stopping at the first problem.
pub fn validate_at(form: &PontoForm, today: NaiveDate) -> Result<PontoRecord, ValidationError> {
    let usuario = form.usuario.trim();
    if usuario.is_empty() {
        return Err(ValidationError::NotLoggedIn);
    }

    let data = form.data.trim();
    let entrada = form.entrada.trim();
    if data.is_empty() || entrada.is_empty() {
        return Err(ValidationError::MissingDateOrArrival);
    }

    let date = NaiveDate::parse_from_str(data, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(data.to_string()))?;
    if date > today {
        return Err(ValidationError::FutureDate);
    }

    let arrival =
        parse_clock(entrada).ok_or_else(|| ValidationError::InvalidArrival(entrada.to_string()))?;

    let departure = parse_clock(form.saida.trim());
    if let Some(departure) = departure {
        if minute_of_day(arrival) > minute_of_day(departure) {
            return Err(ValidationError::ArrivalAfterDeparture);
        }
    }

    Ok(PontoRecord {
        usuario: usuario.to_string(),
        data: date,
        entrada: arrival.format("%H:%M").to_string(),
        saida: departure.map(|time| time.format("%H:%M").to_string()),
    })
}

/// Parses `HH:MM`; time inputs may also carry seconds, which are dropped.
fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn form(data: &str, entrada: &str, saida: &str) -> PontoForm {
        PontoForm {
            usuario: "alice".into(),
            data: data.into(),
            max_data: "2026-01-05".into(),
            entrada: entrada.into(),
            saida: saida.into(),
        }
    }

    #[test]
    fn identity_is_checked_first() {
        let mut input = form("", "", "");
        input.usuario.clear();
        assert_eq!(validate_at(&input, today()), Err(ValidationError::NotLoggedIn));
    }

    #[test]
    fn empty_arrival_is_always_rejected() {
        assert_eq!(
            validate_at(&form("2026-01-05", "", "17:00"), today()),
            Err(ValidationError::MissingDateOrArrival)
        );
        assert_eq!(
            validate_at(&form("2030-01-01", "  ", ""), today()),
            Err(ValidationError::MissingDateOrArrival)
        );
    }

    #[test]
    fn future_dates_compare_as_calendar_dates() {
        assert_eq!(
            validate_at(&form("2026-01-06", "08:00", ""), today()),
            Err(ValidationError::FutureDate)
        );
        assert!(validate_at(&form("2026-01-05", "08:00", ""), today()).is_ok());
        assert!(validate_at(&form("2025-12-31", "08:00", ""), today()).is_ok());
    }

    #[test]
    fn malformed_arrival_is_rejected() {
        assert_eq!(
            validate_at(&form("2026-01-05", "25:00", ""), today()),
            Err(ValidationError::InvalidArrival("25:00".into()))
        );
    }

    #[test]
    fn arrival_after_departure_is_rejected() {
        assert_eq!(
            validate_at(&form("2026-01-05", "17:30", "08:00"), today()),
            Err(ValidationError::ArrivalAfterDeparture)
        );
        let equal = validate_at(&form("2026-01-05", "08:00", "08:00"), today()).unwrap();
        assert_eq!(equal.saida.as_deref(), Some("08:00"));
    }

    #[test]
    fn unparsable_departure_is_sent_as_null() {
        let record = validate_at(&form("2026-01-04", "08:00", "later"), today()).unwrap();
        assert_eq!(record.saida, None);
        assert_eq!(record.entrada, "08:00");
        assert_eq!(record.data, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
    }

    #[test]
    fn seconds_are_dropped_from_times() {
        let record = validate_at(&form("2026-01-05", "08:00:59", "17:15:00"), today()).unwrap();
        assert_eq!(record.entrada, "08:00");
        assert_eq!(record.saida.as_deref(), Some("17:15"));
    }
}
