//! The table of field rules that drives record assembly.

use regex::Regex;

use serde::{Deserialize, Serialize};

use crate::extract::{FieldRule, RuleError};
use crate::record::AuditRecord;

/// Record attribute a field rule writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Tty,
    Exe,
    Key,
    Pid,
    ParentPid,
    Name,
    ProcessTitle,
    AuditUserId,
}

impl Target {
    pub(crate) fn slot<'a>(&self, r: &'a mut AuditRecord) -> &'a mut String {
        match self {
            Target::Tty => &mut r.tty,
            Target::Exe => &mut r.exe,
            Target::Key => &mut r.key,
            Target::Pid => &mut r.pid,
            Target::ParentPid => &mut r.parent_pid,
            Target::Name => &mut r.name,
            Target::ProcessTitle => &mut r.process_title_raw,
            Target::AuditUserId => &mut r.audit_user_id,
        }
    }
}

/// Whether an empty extraction result overwrites the target
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Assign {
    Always,
    #[default]
    IfPresent,
}

#[derive(Clone, Debug)]
pub enum Step {
    Extract(FieldRule),
    /// Copy the raw process title into its readable counterpart
    SnapshotTitle,
}

/// Configuration form of a [`Step`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum StepSpec {
    Extract {
        field: String,
        pattern: String,
        prefix: String,
        target: Target,
        #[serde(default)]
        assign: Assign,
    },
    SnapshotTitle,
}

impl TryFrom<&StepSpec> for Step {
    type Error = RuleError;
    fn try_from(spec: &StepSpec) -> Result<Self, Self::Error> {
        match spec {
            StepSpec::Extract {
                field,
                pattern,
                prefix,
                target,
                assign,
            } => Ok(Step::Extract(FieldRule::new(
                field, pattern, prefix, *target, *assign,
            )?)),
            StepSpec::SnapshotTitle => Ok(Step::SnapshotTitle),
        }
    }
}

const HEADER_PATTERN: &str = r"audit\((.*?)\)";

/// (field, pattern, prefix, target, assign) for the steps that run
/// after the header has been accepted; `None` marks the title
/// snapshot. The `name` rules following the snapshot run again
/// against the same line, the last one overwrites the raw process
/// title.
#[rustfmt::skip]
const DEFAULT_STEPS: &[Option<(&str, &str, &str, Target, Assign)>] = &[
    Some(("terminal", r"terminal=([[:word:]\\/]+)", "terminal=", Target::Tty, Assign::IfPresent)),
    Some(("tty", r"tty=([[:word:]\\/]+)", "tty=", Target::Tty, Assign::IfPresent)),
    Some(("exe", r#"exe="(.*?)""#, "exe=", Target::Exe, Assign::IfPresent)),
    Some(("key", r#"key="(.*?)""#, "key=", Target::Key, Assign::IfPresent)),
    Some(("pid", r"pid=([[:digit:]]+)", "pid=", Target::Pid, Assign::IfPresent)),
    Some(("ppid", r"ppid=([[:digit:]]+)", "ppid=", Target::ParentPid, Assign::IfPresent)),
    Some(("name", r#"name="(.*?)""#, "name=", Target::Name, Assign::Always)),
    Some(("proctitle", r"proctitle=(([[:word:]].?)+)", "proctitle=", Target::ProcessTitle, Assign::Always)),
    None,
    Some(("name", r#"name="(.*?)""#, "name=", Target::Name, Assign::IfPresent)),
    Some(("name", r#"name="(.*?)""#, "name=", Target::ProcessTitle, Assign::IfPresent)),
    Some(("auid", r"auid=([[:digit:]].?)+", "auid=", Target::AuditUserId, Assign::Always)),
];

/// Header rule plus the ordered list of steps applied to a line
#[derive(Clone, Debug)]
pub struct FieldTable {
    pub(crate) header: Regex,
    pub(crate) steps: Vec<Step>,
}

impl FieldTable {
    /// Build a table from configured steps. The header rule is fixed.
    pub fn from_specs(specs: &[StepSpec]) -> Result<Self, RuleError> {
        let steps = specs
            .iter()
            .map(Step::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldTable {
            header: Self::header_rule()?,
            steps,
        })
    }

    /// The built-in table in configuration form
    pub fn default_specs() -> Vec<StepSpec> {
        DEFAULT_STEPS
            .iter()
            .map(|step| match step {
                Some((field, pattern, prefix, target, assign)) => StepSpec::Extract {
                    field: field.to_string(),
                    pattern: pattern.to_string(),
                    prefix: prefix.to_string(),
                    target: *target,
                    assign: *assign,
                },
                None => StepSpec::SnapshotTitle,
            })
            .collect()
    }

    fn header_rule() -> Result<Regex, RuleError> {
        Regex::new(HEADER_PATTERN).map_err(|source| RuleError::InvalidPattern {
            field: "audit".into(),
            source,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        match Self::from_specs(&Self::default_specs()) {
            Ok(table) => table,
            Err(e) => unreachable!("built-in field table: {e}"),
        }
    }
}
