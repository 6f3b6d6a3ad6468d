//! Extract a fixed set of fields (timestamp, event id, process
//! identifiers, executable, terminal, key, name, process title,
//! login user) from single Linux Audit log lines.
//!
//! ```
//! use audit_fields::assemble::Assembler;
//! use audit_fields::fields::FieldTable;
//! use audit_fields::userdb::UserDB;
//!
//! let a = Assembler::new(FieldTable::default(), None::<UserDB>);
//! let r = a.assemble(r#"type=SYSCALL msg=audit(1364481363.243:24287): tty=pts0 exe="/bin/cat""#);
//! assert_eq!(r.timestamp, "1364481363.243");
//! assert_eq!(r.audit_id, "24287");
//! assert_eq!(r.exe, "/bin/cat");
//! ```

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assemble;
pub mod config;
pub mod extract;
pub mod fields;
pub mod logger;
pub mod record;
pub mod userdb;

#[cfg(test)]
mod test;
