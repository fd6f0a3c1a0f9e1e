//! [`IntentEndpoint`] implementation of the [`Rest`] client.

use tracerr::Traced;

use crate::infra::intent::{
    extract_error_message, Error, IntentEndpoint, Request, Response,
};

use super::Rest;

impl IntentEndpoint for Rest {
    async fn create_intent(
        &self,
        request: Request,
    ) -> Result<Response, Traced<Error>> {
        let response = self
            .http
            .post(&self.config.intent_url)
            .json(&request)
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(tracerr::new!(Error::Rejected(
                extract_error_message(status.as_u16(), &body),
            )));
        }
        response
            .json()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}
