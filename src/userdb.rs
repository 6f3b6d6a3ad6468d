use std::collections::BTreeMap;

use nix::unistd::{Uid, User};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid uid {0:?}")]
    InvalidId(String),
    #[error("unknown uid {0}")]
    NotFound(u32),
    #[error("lookup failed: {0}")]
    Lookup(#[from] nix::Error),
}

/// Translates numeric user ids as found in audit records to account
/// names.
pub trait UserDirectory {
    fn resolve_username(&self, id: &str) -> Result<String, LookupError>;
}

fn parse_uid(id: &str) -> Result<u32, LookupError> {
    id.trim()
        .parse()
        .map_err(|_| LookupError::InvalidId(id.to_string()))
}

/// The host's account database, as seen through getpwuid_r(3)
#[derive(Clone, Copy, Debug, Default)]
pub struct UserDB;

impl UserDirectory for UserDB {
    fn resolve_username(&self, id: &str) -> Result<String, LookupError> {
        let uid = parse_uid(id)?;
        User::from_uid(Uid::from(uid))?
            .map(|user| user.name)
            .ok_or(LookupError::NotFound(uid))
    }
}

/// Fixed uid => name mapping
#[derive(Clone, Debug, Default)]
pub struct StaticUserDB(BTreeMap<u32, String>);

impl StaticUserDB {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        StaticUserDB(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl UserDirectory for StaticUserDB {
    fn resolve_username(&self, id: &str) -> Result<String, LookupError> {
        let uid = parse_uid(id)?;
        self.0.get(&uid).cloned().ok_or(LookupError::NotFound(uid))
    }
}

impl<T: UserDirectory + ?Sized> UserDirectory for &T {
    fn resolve_username(&self, id: &str) -> Result<String, LookupError> {
        (**self).resolve_username(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn static_db() {
        let db = StaticUserDB::new([(0, "root"), (1000, "kevin")]);
        assert_eq!(db.resolve_username("1000").unwrap(), "kevin");
        assert_eq!(db.resolve_username("0 ").unwrap(), "root");
        assert!(matches!(
            db.resolve_username("4294967295"),
            Err(LookupError::NotFound(4294967295))
        ));
        assert!(matches!(
            db.resolve_username("1x"),
            Err(LookupError::InvalidId(_))
        ));
    }

    #[test]
    /// This is not a real test case, it is just intended for
    /// diagnostic purposes.
    fn userdb() {
        let uid = Uid::current();
        println!(
            "user for uid {uid}: {:?}",
            UserDB.resolve_username(&uid.to_string())
        );
        assert!(matches!(
            UserDB.resolve_username("-1"),
            Err(LookupError::InvalidId(_))
        ));
    }
}
