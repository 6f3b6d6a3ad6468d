use serde::Serialize;

/// Fields extracted from a single audit log line. Every field is
/// empty unless the corresponding rule matched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    /// `audit(1364481363.243:24287)`
    #[serde(rename = "auditIDRaw")]
    pub raw_audit_header: String,
    #[serde(rename = "auditID")]
    pub audit_id: String,
    pub timestamp: String,

    /// Never written by the built-in table: `terminal=` values end
    /// up in `tty`.
    pub terminal: String,
    pub tty: String,
    pub exe: String,
    pub key: String,

    pub pid: String,
    #[serde(rename = "ppid")]
    pub parent_pid: String,
    #[serde(rename = "auid")]
    pub audit_user_id: String,
    #[serde(rename = "auid_hr")]
    pub audit_user_name: String,

    pub name: String,

    #[serde(skip)]
    pub process_title_raw: String,
    #[serde(rename = "proctitle")]
    pub process_title_readable: String,
}

impl AuditRecord {
    /// Whether the line carried a usable `audit(…)` header
    pub fn has_header(&self) -> bool {
        !self.timestamp.is_empty()
    }
}
