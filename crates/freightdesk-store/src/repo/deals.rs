use crate::error::{Result, StoreError};
use crate::repo::calls::call_exists;
use freightdesk_core::domain::{CallId, Deal, DealId, DealNew, DealView};
use rusqlite::{params, Connection};

const DEAL_VIEW_SELECT: &str = "SELECT deals.id,
        deals.load_id,
        deals.start_location,
        deals.end_location,
        deals.call_id,
        deals.initial_price,
        deals.agreed_price,
        deals.created_at,
        calls.sentiment,
        calls.dba,
        calls.datetime,
        calls.outcome
 FROM deals
 LEFT JOIN calls ON calls.id = deals.call_id";

pub struct DealsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> DealsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: DealNew) -> Result<Deal> {
        input.terms.validate()?;
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            ensure_call_reference(&tx, input.call_id)?;
            let deal = insert_deal(&tx, now_utc, input)?;
            tx.commit()?;
            Ok(deal)
        } else {
            ensure_call_reference(self.conn, input.call_id)?;
            insert_deal(self.conn, now_utc, input)
        }
    }

    /// All deals with their call summary, newest deal first.
    pub fn list(&self) -> Result<Vec<DealView>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEAL_VIEW_SELECT} ORDER BY deals.created_at DESC, deals.id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut deals = Vec::new();
        while let Some(row) = rows.next()? {
            deals.push(deal_view_from_row(row)?);
        }
        Ok(deals)
    }

    pub fn list_for_call(&self, call_id: CallId) -> Result<Vec<Deal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEAL_VIEW_SELECT} WHERE deals.call_id = ?1 ORDER BY deals.id ASC;"
        ))?;
        let mut rows = stmt.query([call_id.get()])?;
        let mut deals = Vec::new();
        while let Some(row) = rows.next()? {
            deals.push(deal_view_from_row(row)?.deal);
        }
        Ok(deals)
    }

    pub fn get(&self, id: DealId) -> Result<Option<DealView>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEAL_VIEW_SELECT} WHERE deals.id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        match rows.next()? {
            Some(row) => Ok(Some(deal_view_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Full replacement. A non-null `call_id` must point at an existing call.
    pub fn update(&self, id: DealId, input: DealNew) -> Result<Deal> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let deal = update_inner(&tx, id, input)?;
            tx.commit()?;
            Ok(deal)
        } else {
            update_inner(self.conn, id, input)
        }
    }

    pub fn delete(&self, id: DealId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM deals WHERE id = ?1;", [id.get()])?;
        if deleted == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

pub(crate) fn insert_deal(conn: &Connection, now_utc: i64, input: DealNew) -> Result<Deal> {
    let DealNew { terms, call_id } = input;
    conn.execute(
        "INSERT INTO deals (load_id, start_location, end_location, call_id, initial_price, agreed_price, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            terms.load_id,
            terms.start_location,
            terms.end_location,
            call_id.map(|id| id.get()),
            terms.initial_price,
            terms.agreed_price,
            now_utc,
        ],
    )?;

    Ok(Deal {
        id: DealId(conn.last_insert_rowid()),
        load_id: terms.load_id,
        start_location: terms.start_location,
        end_location: terms.end_location,
        call_id,
        initial_price: terms.initial_price,
        agreed_price: terms.agreed_price,
        created_at: now_utc,
    })
}

fn update_inner(conn: &Connection, id: DealId, input: DealNew) -> Result<Deal> {
    let created_at: i64 = conn
        .query_row(
            "SELECT created_at FROM deals WHERE id = ?1;",
            [id.get()],
            |row| row.get(0),
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => not_found(id),
            other => other.into(),
        })?;
    input.terms.validate()?;
    ensure_call_reference(conn, input.call_id)?;

    let DealNew { terms, call_id } = input;
    conn.execute(
        "UPDATE deals SET load_id = ?2, start_location = ?3, end_location = ?4, call_id = ?5, initial_price = ?6, agreed_price = ?7
         WHERE id = ?1;",
        params![
            id.get(),
            terms.load_id,
            terms.start_location,
            terms.end_location,
            call_id.map(|id| id.get()),
            terms.initial_price,
            terms.agreed_price,
        ],
    )?;

    Ok(Deal {
        id,
        load_id: terms.load_id,
        start_location: terms.start_location,
        end_location: terms.end_location,
        call_id,
        initial_price: terms.initial_price,
        agreed_price: terms.agreed_price,
        created_at,
    })
}

fn ensure_call_reference(conn: &Connection, call_id: Option<CallId>) -> Result<()> {
    match call_id {
        Some(call_id) if !call_exists(conn, call_id)? => Err(StoreError::MissingCall(call_id)),
        _ => Ok(()),
    }
}

fn not_found(id: DealId) -> StoreError {
    StoreError::NotFound(format!("deal {id}"))
}

fn deal_view_from_row(row: &rusqlite::Row<'_>) -> Result<DealView> {
    let call_id: Option<i64> = row.get(4)?;
    Ok(DealView {
        deal: Deal {
            id: DealId(row.get(0)?),
            load_id: row.get(1)?,
            start_location: row.get(2)?,
            end_location: row.get(3)?,
            call_id: call_id.map(CallId),
            initial_price: row.get(5)?,
            agreed_price: row.get(6)?,
            created_at: row.get(7)?,
        },
        call_sentiment: row.get(8)?,
        call_dba: row.get(9)?,
        call_datetime: row.get(10)?,
        call_outcome: row.get(11)?,
    })
}
