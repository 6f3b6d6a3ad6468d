use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::extract::RuleError;
use crate::fields::{FieldTable, StepSpec};

#[derive(Clone, Debug, Default, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum Input {
    #[default]
    Stdin,
    File(PathBuf),
}

impl Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => write!(f, "stdin"),
            Input::File(p) => write!(f, "file:{}", p.to_string_lossy()),
        }
    }
}

impl FromStr for Input {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if s == "stdin" => Ok(Input::Stdin),
            Some(("file", path)) if !path.is_empty() => Ok(Input::File(path.into())),
            _ => Err(format!("can't parse input {}", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    /// `-` for stdout
    pub file: PathBuf,
    #[serde(rename = "line-prefix")]
    pub line_prefix: Option<String>,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            file: "-".into(),
            line_prefix: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub input: Input,
    pub output: Output,
    pub resolve_users: bool,
    pub skip_headerless: bool,
    pub log_level: LevelFilter,
    pub syslog: bool,
    pub fields: Option<Vec<StepSpec>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: Input::default(),
            output: Output::default(),
            resolve_users: true,
            skip_headerless: false,
            log_level: LevelFilter::Info,
            syslog: true,
            fields: None,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input={} output={} resolve-users={} skip-headerless={} log-level={} syslog={} fields={}",
            self.input,
            self.output.file.to_string_lossy(),
            self.resolve_users,
            self.skip_headerless,
            self.log_level,
            self.syslog,
            match &self.fields {
                Some(f) => format!("custom({})", f.len()),
                None => "built-in".into(),
            }
        )
    }
}

impl Config {
    pub fn make_field_table(&self) -> Result<FieldTable, RuleError> {
        match &self.fields {
            Some(specs) => FieldTable::from_specs(specs),
            None => Ok(FieldTable::default()),
        }
    }
}
