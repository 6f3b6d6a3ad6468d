use crate::extract::extract;
use crate::fields::{Assign, FieldTable, Step};
use crate::record::AuditRecord;
use crate::userdb::{UserDB, UserDirectory};

/// Headers of this length or shorter are not processed further.
const MIN_HEADER_LEN: usize = 20;

/// Split `audit(1364481363.243:24287)` into timestamp and event id.
fn split_header(raw: &str) -> Option<(&str, &str)> {
    if raw.len() <= MIN_HEADER_LEN {
        return None;
    }
    let timestamp = raw.get(6..20)?;
    let id = raw.get(21..)?;
    Some((timestamp, id.strip_suffix(')').unwrap_or(id)))
}

/// Turns single audit log lines into [`AuditRecord`]s.
///
/// The assembler holds no per-line state; `assemble` can be called
/// from several threads at once if the user directory allows it.
#[derive(Debug)]
pub struct Assembler<D = UserDB> {
    table: FieldTable,
    users: Option<D>,
}

impl Default for Assembler<UserDB> {
    fn default() -> Self {
        Assembler::new(FieldTable::default(), Some(UserDB))
    }
}

impl<D: UserDirectory> Assembler<D> {
    /// Pass `None` for `users` to skip the `auid` => name lookup.
    pub fn new(table: FieldTable, users: Option<D>) -> Self {
        Assembler { table, users }
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    pub fn assemble(&self, line: &str) -> AuditRecord {
        let mut rec = AuditRecord {
            raw_audit_header: extract(&self.table.header, line, ""),
            ..Default::default()
        };

        match split_header(&rec.raw_audit_header) {
            Some((timestamp, id)) => {
                rec.timestamp = timestamp.into();
                rec.audit_id = id.into();
            }
            None => return rec,
        }

        for step in &self.table.steps {
            match step {
                Step::Extract(rule) => {
                    let value = rule.extract(line);
                    if rule.assign() == Assign::Always || !value.is_empty() {
                        *rule.target().slot(&mut rec) = value;
                    }
                }
                Step::SnapshotTitle => {
                    rec.process_title_readable = rec.process_title_raw.clone();
                }
            }
        }

        match &self.users {
            Some(users) if !rec.audit_user_id.is_empty() => {
                match users.resolve_username(&rec.audit_user_id) {
                    Ok(name) => rec.audit_user_name = name,
                    Err(e) => log::warn!("auid {}: {}", &rec.audit_user_id, e),
                }
            }
            _ => (),
        }

        rec
    }
}
