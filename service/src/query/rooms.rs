//! [`Query`] for listing the [`Room`] catalog.

use common::{
    operations::{By, Select},
    paginate, Page, PageNumber,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::Room,
    infra::{database, Database},
    read,
    Service,
};

use super::Query;

/// [`Query`] for listing the [`Room`] catalog, filtered and paginated.
///
/// Filtering happens before pagination, so page numbers always refer to
/// the filtered collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListRooms {
    /// [`Filter`] to apply to the catalog.
    ///
    /// [`Filter`]: read::room::Filter
    pub criteria: read::room::Filter,

    /// Number of the [`Page`] to return.
    pub page: PageNumber,
}

impl<B> Query<ListRooms> for Service<B>
where
    B: Database<
        Select<By<Vec<Room>, ()>>,
        Ok = Vec<Room>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Page<read::RoomListing>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ListRooms) -> Result<Self::Ok, Self::Err> {
        let rooms = self
            .backend()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        let listings = rooms
            .iter()
            .filter(|room| query.criteria.matches(room))
            .map(read::RoomListing::from)
            .collect::<Vec<_>>();
        Ok(paginate(&listings, self.config().per_page, query.page))
    }
}

/// Error of [`ListRooms`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
