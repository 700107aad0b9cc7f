//! Streaming result set over matched records
//!
//! [`ResultSet`] wraps the driver cursor and deserializes each raw record
//! into the model type as it is polled. It is a forward-only [`Stream`]: a
//! record that fails to deserialize surfaces as an `Err` item and the stream
//! keeps going, and once the underlying cursor is exhausted the stream stays
//! exhausted.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt};
use mongodb::Cursor;

use jadeite_common::Result;

use crate::document::{Model, Record};

/// Forward-only stream of models matched by a query
///
/// Obtained from [`crate::dao::MongoDao::find_many`]. Consume it with the
/// [`StreamExt`] combinators or drain it with [`ResultSet::to_vec`]:
///
/// ```ignore
/// use futures::StreamExt;
///
/// let mut users = dao.find_many(&condition).await?;
/// while let Some(user) = users.next().await {
///     println!("{:?}", user?);
/// }
/// ```
pub struct ResultSet<T> {
    records: BoxStream<'static, Result<Record>>,
    _model: PhantomData<fn() -> T>,
}

impl<T: Model> ResultSet<T> {
    pub(crate) fn from_cursor(cursor: Cursor<Record>) -> Self {
        Self::from_records(cursor.map_err(jadeite_common::JadeiteError::from))
    }

    pub(crate) fn from_records<S>(records: S) -> Self
    where
        S: Stream<Item = Result<Record>> + Send + 'static,
    {
        Self {
            records: records.fuse().boxed(),
            _model: PhantomData,
        }
    }

    /// Drain the remaining records into a vector
    ///
    /// Stops at the first error, so a partially broken result set returns
    /// `Err` rather than a truncated vector.
    pub async fn to_vec(self) -> Result<Vec<T>> {
        self.try_collect().await
    }
}

impl<T: Model> Stream for ResultSet<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut().records.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(record))) => Poll::Ready(Some(T::from_record(record))),
            Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}
