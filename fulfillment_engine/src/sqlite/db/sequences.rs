use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::SequenceKind, traits::FulfillmentError};

/// Allocates the next id for the given kind of record.
///
/// The counter row is bumped with a single `UPDATE .. RETURNING` statement, so the id is unique even when several
/// writers race. Call this inside the transaction that inserts the record: if that transaction rolls back, so does the
/// counter. Since the statement is a write, calling it first in a transaction also takes the write lock up front.
pub async fn next_id(kind: SequenceKind, conn: &mut SqliteConnection) -> Result<i64, FulfillmentError> {
    let id: Option<i64> =
        sqlx::query_scalar("UPDATE sequences SET value = value + 1 WHERE name = $1 RETURNING value")
            .bind(kind.counter_name())
            .fetch_optional(conn)
            .await?;
    let id = id.ok_or_else(|| FulfillmentError::DatabaseError(format!("No sequence counter exists for {kind}")))?;
    trace!("🔢️ Allocated {kind} id {id}");
    Ok(id)
}
