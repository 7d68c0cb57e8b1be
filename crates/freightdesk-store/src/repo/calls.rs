use crate::error::{Result, StoreError};
use crate::repo::deals::insert_deal;
use freightdesk_core::domain::{Call, CallFields, CallId, CallRecord, DealNew, DealTerms};
use freightdesk_core::CoreError;
use rusqlite::{params, Connection, OptionalExtension};

const CALL_COLUMNS: &str = "id, sentiment, dba, datetime, outcome, call_outcome, created_at";

pub struct CallsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CallsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Records a call. An agreement outcome must carry deal terms; the call and
    /// its deal are written in one transaction, and nothing is written when
    /// validation fails. Terms passed with any other outcome are ignored.
    pub fn create(
        &self,
        now_utc: i64,
        fields: CallFields,
        terms: Option<DealTerms>,
    ) -> Result<CallRecord> {
        fields.validate()?;
        let terms = if fields.is_agreement() {
            Some(require_terms(terms)?)
        } else {
            None
        };

        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let record = create_inner(&tx, now_utc, fields, terms)?;
            tx.commit()?;
            Ok(record)
        } else {
            create_inner(self.conn, now_utc, fields, terms)
        }
    }

    /// All calls, most recent conversation first.
    pub fn list(&self) -> Result<Vec<Call>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CALL_COLUMNS} FROM calls ORDER BY datetime DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut calls = Vec::new();
        while let Some(row) = rows.next()? {
            calls.push(call_from_row(row)?);
        }
        Ok(calls)
    }

    pub fn get(&self, id: CallId) -> Result<Option<Call>> {
        get_inner(self.conn, id)
    }

    /// Replaces every caller-controlled field. Changing the outcome to an
    /// agreement does not create a deal.
    pub fn update(&self, id: CallId, fields: CallFields) -> Result<Call> {
        let existing = get_inner(self.conn, id)?.ok_or_else(|| not_found(id))?;
        fields.validate()?;

        self.conn.execute(
            "UPDATE calls SET sentiment = ?2, dba = ?3, datetime = ?4, outcome = ?5, call_outcome = ?6
             WHERE id = ?1;",
            params![
                id.get(),
                fields.sentiment,
                fields.dba,
                fields.datetime,
                fields.outcome,
                fields.call_outcome,
            ],
        )?;

        Ok(Call {
            id,
            sentiment: fields.sentiment,
            dba: fields.dba,
            datetime: fields.datetime,
            outcome: fields.outcome,
            call_outcome: fields.call_outcome,
            created_at: existing.created_at,
        })
    }

    /// Deletes the call only; deals pointing at it keep their `call_id`.
    pub fn delete(&self, id: CallId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM calls WHERE id = ?1;", [id.get()])?;
        if deleted == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

pub(crate) fn call_exists(conn: &Connection, id: CallId) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM calls WHERE id = ?1;", [id.get()], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn require_terms(terms: Option<DealTerms>) -> Result<DealTerms> {
    let Some(terms) = terms else {
        return Err(CoreError::MissingDealFields(vec![
            "load_id",
            "start_location",
            "end_location",
        ])
        .into());
    };
    let missing = terms.missing_fields();
    if !missing.is_empty() {
        return Err(CoreError::MissingDealFields(missing).into());
    }
    Ok(terms)
}

fn create_inner(
    conn: &Connection,
    now_utc: i64,
    fields: CallFields,
    terms: Option<DealTerms>,
) -> Result<CallRecord> {
    conn.execute(
        "INSERT INTO calls (sentiment, dba, datetime, outcome, call_outcome, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            fields.sentiment,
            fields.dba,
            fields.datetime,
            fields.outcome,
            fields.call_outcome,
            now_utc,
        ],
    )?;
    let call = Call {
        id: CallId(conn.last_insert_rowid()),
        sentiment: fields.sentiment,
        dba: fields.dba,
        datetime: fields.datetime,
        outcome: fields.outcome,
        call_outcome: fields.call_outcome,
        created_at: now_utc,
    };

    let deal = match terms {
        Some(terms) => Some(insert_deal(
            conn,
            now_utc,
            DealNew {
                terms,
                call_id: Some(call.id),
            },
        )?),
        None => None,
    };

    Ok(CallRecord { call, deal })
}

fn get_inner(conn: &Connection, id: CallId) -> Result<Option<Call>> {
    let mut stmt = conn.prepare(&format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.get()])?;
    match rows.next()? {
        Some(row) => Ok(Some(call_from_row(row)?)),
        None => Ok(None),
    }
}

fn not_found(id: CallId) -> StoreError {
    StoreError::NotFound(format!("call {id}"))
}

fn call_from_row(row: &rusqlite::Row<'_>) -> Result<Call> {
    Ok(Call {
        id: CallId(row.get(0)?),
        sentiment: row.get(1)?,
        dba: row.get(2)?,
        datetime: row.get(3)?,
        outcome: row.get(4)?,
        call_outcome: row.get(5)?,
        created_at: row.get(6)?,
    })
}
