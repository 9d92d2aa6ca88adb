use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::MapRusqlite;
use crate::store::Store;
use forktrace_types::{Error, Mail, Result, MAIL_BODY_MAX_LEN};

fn row_to_mail(row: &Row) -> rusqlite::Result<Mail> {
    let from_uuid: String = row.get("from_uuid")?;
    let to_uuid: String = row.get("to_uuid")?;
    let read: i64 = row.get("read")?;
    Ok(Mail {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        from_uuid: Uuid::parse_str(&from_uuid).unwrap_or_default(),
        to_uuid: Uuid::parse_str(&to_uuid).unwrap_or_default(),
        body: row.get("body")?,
        timestamp: row.get("timestamp")?,
        read: read != 0,
    })
}

impl Store {
    /// Validates the recipient exists and is running and the body is
    /// non-empty and bounded before inserting.
    pub fn send_mail(
        &self,
        session_id: i64,
        from_uuid: Uuid,
        to_uuid: Uuid,
        body: &str,
        timestamp: i64,
    ) -> Result<i64> {
        if body.is_empty() {
            return Err(Error::parse("mail body must not be empty"));
        }
        if body.len() > MAIL_BODY_MAX_LEN {
            return Err(Error::parse(format!(
                "mail body exceeds {MAIL_BODY_MAX_LEN} characters"
            )));
        }
        let recipient = self.get_agent(to_uuid)?;
        if !recipient.is_running() {
            return Err(Error::referential_integrity(format!(
                "recipient {to_uuid} is not running"
            )));
        }
        self.conn
            .execute(
                "INSERT INTO mail (session_id, from_uuid, to_uuid, body, timestamp, read)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                params![
                    session_id,
                    from_uuid.to_string(),
                    to_uuid.to_string(),
                    body,
                    timestamp
                ],
            )
            .map_store_err()?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Unread first, then timestamp DESC.
    pub fn inbox(&self, session_id: i64, to_uuid: Uuid) -> Result<Vec<Mail>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT * FROM mail WHERE session_id = ?1 AND to_uuid = ?2
                 ORDER BY read ASC, timestamp DESC",
            )
            .map_store_err()?;
        let rows = stmt
            .query_map(params![session_id, to_uuid.to_string()], row_to_mail)
            .map_store_err()?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_store_err()?);
        }
        Ok(out)
    }

    pub fn inbox_filtered(&self, session_id: i64, to_uuid: Uuid, from_uuid: Uuid) -> Result<Vec<Mail>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT * FROM mail WHERE session_id = ?1 AND to_uuid = ?2 AND from_uuid = ?3
                 ORDER BY read ASC, timestamp DESC",
            )
            .map_store_err()?;
        let rows = stmt
            .query_map(
                params![session_id, to_uuid.to_string(), from_uuid.to_string()],
                row_to_mail,
            )
            .map_store_err()?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_store_err()?);
        }
        Ok(out)
    }

    pub fn mark_mail_read(&self, mail_id: i64) -> Result<()> {
        self.conn
            .execute("UPDATE mail SET read = 1 WHERE id = ?1", params![mail_id])
            .map_store_err()?;
        Ok(())
    }

    /// Authorization is opaque: any mismatch between `recipient_uuid` and the
    /// mail's actual recipient, or the mail not existing at all, returns the
    /// same `Authorization` error.
    pub fn delete_mail(&self, mail_id: i64, recipient_uuid: Uuid) -> Result<()> {
        let actual_recipient: Option<String> = self
            .conn
            .query_row(
                "SELECT to_uuid FROM mail WHERE id = ?1",
                params![mail_id],
                |r| r.get(0),
            )
            .optional()
            .map_store_err()?;
        match actual_recipient {
            Some(ref to) if *to == recipient_uuid.to_string() => {
                self.conn
                    .execute("DELETE FROM mail WHERE id = ?1", params![mail_id])
                    .map_store_err()?;
                Ok(())
            }
            _ => Err(Error::authorization(format!(
                "mail {mail_id} does not belong to {recipient_uuid}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forktrace_types::Agent;

    fn setup_pair(store: &Store) -> (i64, Agent, Agent) {
        let session_id = store.create_session().unwrap();
        let a = Agent::new_root(Uuid::new_v4(), Utc::now());
        let mut b = Agent::new_root(Uuid::new_v4(), Utc::now());
        b.parent_uuid = Some(a.uuid);
        store.insert_agent(&a).unwrap();
        store.insert_agent(&b).unwrap();
        (session_id, a, b)
    }

    #[test]
    fn rejects_empty_body() {
        let store = Store::open_in_memory().unwrap();
        let (session_id, a, b) = setup_pair(&store);
        let err = store.send_mail(session_id, a.uuid, b.uuid, "", 0).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn rejects_recipient_not_running() {
        let store = Store::open_in_memory().unwrap();
        let (session_id, a, b) = setup_pair(&store);
        store.mark_dead(b.uuid).unwrap();
        let err = store
            .send_mail(session_id, a.uuid, b.uuid, "hi", 0)
            .unwrap_err();
        assert_eq!(err.kind(), "referential_integrity");
    }

    #[test]
    fn inbox_orders_unread_first_then_recent() {
        let store = Store::open_in_memory().unwrap();
        let (session_id, a, b) = setup_pair(&store);
        let m1 = store.send_mail(session_id, a.uuid, b.uuid, "first", 100).unwrap();
        let _m2 = store.send_mail(session_id, a.uuid, b.uuid, "second", 200).unwrap();
        store.mark_mail_read(m1).unwrap();

        let inbox = store.inbox(session_id, b.uuid).unwrap();
        assert_eq!(inbox[0].body, "second");
        assert_eq!(inbox[1].body, "first");
    }

    #[test]
    fn delete_requires_matching_recipient() {
        let store = Store::open_in_memory().unwrap();
        let (session_id, a, b) = setup_pair(&store);
        let mail_id = store.send_mail(session_id, a.uuid, b.uuid, "hi", 0).unwrap();
        let err = store.delete_mail(mail_id, a.uuid).unwrap_err();
        assert_eq!(err.kind(), "authorization");
        store.delete_mail(mail_id, b.uuid).unwrap();
    }
}
