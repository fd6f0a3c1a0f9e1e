//! [`Query`] for fetching a single [`Room`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] for fetching the [`Room`] with the provided ID.
#[derive(Clone, Copy, Debug)]
pub struct GetRoom(pub room::Id);

impl<B> Query<GetRoom> for Service<B>
where
    B: Database<
        Select<By<Option<Room>, room::Id>>,
        Ok = Option<Room>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Room>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        GetRoom(id): GetRoom,
    ) -> Result<Self::Ok, Self::Err> {
        self.backend()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`GetRoom`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
