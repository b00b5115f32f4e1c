//! Client for the external people-info service used to enrich registrations.
//!
//! `GET {base}/info?passportSerie=SSSS&passportNumber=NNNNNN` answers with
//! `{"surname", "name", "patronymic", "address"}`.

use log::debug;
use reqwest::StatusCode;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use timetrack_core::{Passport, PersonProfile};

#[derive(Debug)]
pub enum LookupError {
    Transport(reqwest::Error),
    Status(StatusCode),
    Decode(reqwest::Error),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "people-info request failed: {err}"),
            Self::Status(status) => write!(f, "people-info service answered {status}"),
            Self::Decode(err) => write!(f, "people-info response is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) | Self::Decode(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeopleInfoClient {
    http: reqwest::Client,
    base_url: String,
}

impl PeopleInfoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LookupError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn lookup(&self, passport: &Passport) -> Result<PersonProfile, LookupError> {
        let url = format!("{}/info", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("passportSerie", passport.series()),
                ("passportNumber", passport.number()),
            ])
            .send()
            .await
            .map_err(LookupError::Transport)?;

        let status = response.status();
        debug!("event=people_lookup module=server status={}", status.as_u16());
        if status != StatusCode::OK {
            return Err(LookupError::Status(status));
        }

        response
            .json::<PersonProfile>()
            .await
            .map_err(LookupError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupError, PeopleInfoClient};
    use std::time::Duration;
    use timetrack_core::Passport;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PeopleInfoClient {
        PeopleInfoClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn lookup_decodes_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .and(query_param("passportSerie", "1234"))
            .and(query_param("passportNumber", "567890"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "surname": "Ivanov",
                "name": "Ivan",
                "patronymic": "Ivanovich",
                "address": "Moscow, Lenina 5"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client(&server)
            .lookup(&Passport::parse("1234 567890").unwrap())
            .await
            .unwrap();
        assert_eq!(profile.surname, "Ivanov");
        assert_eq!(profile.address, "Moscow, Lenina 5");
    }

    #[tokio::test]
    async fn lookup_maps_non_ok_status() {
        let server = MockServer::start().await;
        Mock::given(path("/info"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server)
            .lookup(&Passport::parse("1234 567890").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Status(status) if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn lookup_maps_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .lookup(&Passport::parse("1234 567890").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }
}
