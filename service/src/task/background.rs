//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a finished [`Task`].
type TaskError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s.
///
/// Hosts a [`task::LocalSet`], so spawned [`Task`]s may be `!Send`.
/// Awaiting the [`Background`] drives every spawned [`Task`] and resolves
/// once any of them errors, or all of them finish.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s run on.
    set: task::LocalSet,

    /// Names and handles of the spawned [`Task`]s.
    handles: Vec<(&'static str, task::JoinHandle<Result<(), TaskError>>)>,
}

impl Background {
    /// Spawns a new [`Task`] inside this [`Background`] environment under
    /// the provided `name`.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        let handle = self.set.spawn_local(
            future.map_err(|e| TaskError::from(Box::new(e))),
        );
        self.handles.push((name, handle));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        let tasks = handles.into_iter().map(|(name, handle)| {
            handle
                .map(move |joined| match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        log::error!("`task::{name}` failed: {e}");
                        Err(e)
                    }
                    Err(e) => {
                        log::error!("`task::{name}` panicked: {e}");
                        Err(TaskError::from(Box::new(e)))
                    }
                })
                .boxed_local()
        });
        future::try_join_all(
            iter::once(set.map(Ok).boxed_local()).chain(tasks),
        )
        .map_ok(drop)
        .boxed_local()
    }
}
