//! [`Query`] for listing recorded payments.

use common::{
    operations::{By, Select},
    paginate, Page, PageNumber,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::payment::PaymentRecord,
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] for listing recorded payments, newest first, paginated.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListPayments {
    /// Number of the [`Page`] to return.
    pub page: PageNumber,
}

impl<B> Query<ListPayments> for Service<B>
where
    B: Database<
        Select<By<Vec<PaymentRecord>, ()>>,
        Ok = Vec<PaymentRecord>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Page<PaymentRecord>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ListPayments,
    ) -> Result<Self::Ok, Self::Err> {
        let records = self
            .backend()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        Ok(paginate(&records, self.config().per_page, query.page))
    }
}

/// Error of [`ListPayments`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
