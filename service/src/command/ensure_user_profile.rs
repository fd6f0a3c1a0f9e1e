//! [`Command`] for resolving the [`Profile`] of an authenticated user.

use std::convert::Infallible;

use common::operations::{By, Insert, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, Profile},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for resolving the [`Profile`] of the user with the provided
/// ID, creating a default one if the store has none yet.
///
/// Store failures are swallowed into a default [`Profile`]: a role lookup
/// must never lock an authenticated user out of the application.
#[derive(Clone, Copy, Debug)]
pub struct EnsureUserProfile(pub user::Id);

impl<B> Command<EnsureUserProfile> for Service<B>
where
    B: Database<
            Select<By<Option<Profile>, user::Id>>,
            Ok = Option<Profile>,
            Err = Traced<database::Error>,
        > + Database<Insert<Profile>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Profile;
    type Err = Infallible;

    async fn execute(
        &self,
        EnsureUserProfile(user_id): EnsureUserProfile,
    ) -> Result<Self::Ok, Self::Err> {
        let existing = match self
            .backend()
            .execute(Select(By::new(user_id)))
            .await
        {
            Ok(existing) => existing,
            Err(e) => {
                log::warn!(
                    %user_id,
                    error = %e.as_ref(),
                    "profile lookup failed, assuming default role",
                );
                return Ok(Profile::new(user_id));
            }
        };
        if let Some(profile) = existing {
            return Ok(profile);
        }

        let profile = Profile::new(user_id);
        if let Err(e) =
            self.backend().execute(Insert(profile.clone())).await
        {
            log::warn!(
                %user_id,
                error = %e.as_ref(),
                "profile creation failed, proceeding with default role",
            );
        }
        Ok(profile)
    }
}
