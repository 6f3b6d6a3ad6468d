use regex::Regex;
use regex_syntax::hir::{Hir, HirKind};

use thiserror::Error;

use crate::fields::{Assign, Target};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("field {field}: invalid pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("field {field}: not every match of pattern {pattern:?} starts with prefix {prefix:?}")]
    PrefixMismatch {
        field: String,
        prefix: String,
        pattern: String,
    },
}

/// Return the first (leftmost) match of `pattern` in `line`, with
/// the first `prefix.len()` bytes removed. If the remainder starts
/// with a double quote, all double quotes are removed from it.
///
/// An empty string is returned if nothing matches.
///
/// # Panics
///
/// If `prefix` is longer than the match. This means that pattern and
/// prefix have been paired up incorrectly; [`FieldRule::new`] rejects
/// such pairs.
pub fn extract(pattern: &Regex, line: &str, prefix: &str) -> String {
    let m = match pattern.find(line) {
        Some(m) => m.as_str(),
        None => return String::new(),
    };
    let value = match m.get(prefix.len()..) {
        Some(v) => v,
        None => panic!("prefix {prefix:?} is too long for match {m:?} in line {line:?}"),
    };
    if value.starts_with('"') {
        value.replace('"', "")
    } else {
        value.to_string()
    }
}

/// Literal text every match of `hir` must begin with. Alternations,
/// repetitions and classes end the literal run.
fn leading_literal(hir: &Hir) -> Vec<u8> {
    match hir.kind() {
        HirKind::Literal(lit) => lit.0.to_vec(),
        HirKind::Capture(cap) => leading_literal(&cap.sub),
        HirKind::Concat(subs) => {
            let mut buf = Vec::new();
            for sub in subs {
                match sub.kind() {
                    HirKind::Literal(lit) => buf.extend_from_slice(&lit.0),
                    _ => {
                        buf.extend(leading_literal(sub));
                        break;
                    }
                }
            }
            buf
        }
        _ => Vec::new(),
    }
}

/// A single field recognizer: the pattern, the literal text that
/// precedes the value in a match, and where the value goes.
#[derive(Clone, Debug)]
pub struct FieldRule {
    field: String,
    pattern: Regex,
    prefix: String,
    target: Target,
    assign: Assign,
}

impl FieldRule {
    /// Compile `pattern` and check that every match it can produce
    /// begins with `prefix`.
    pub fn new(
        field: &str,
        pattern: &str,
        prefix: &str,
        target: Target,
        assign: Assign,
    ) -> Result<Self, RuleError> {
        let compiled = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            field: field.into(),
            source,
        })?;
        let covered = prefix.is_empty()
            || regex_syntax::parse(pattern)
                .map(|hir| leading_literal(&hir).starts_with(prefix.as_bytes()))
                .unwrap_or(false);
        if !covered {
            return Err(RuleError::PrefixMismatch {
                field: field.into(),
                prefix: prefix.into(),
                pattern: pattern.into(),
            });
        }
        Ok(FieldRule {
            field: field.into(),
            pattern: compiled,
            prefix: prefix.into(),
            target,
            assign,
        })
    }

    pub fn extract(&self, line: &str) -> String {
        extract(&self.pattern, line, &self.prefix)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn assign(&self) -> Assign {
        self.assign
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn rule(pattern: &str, prefix: &str) -> FieldRule {
        FieldRule::new("test", pattern, prefix, Target::Exe, Assign::IfPresent).unwrap()
    }

    #[test]
    fn plain_value() {
        let r = rule(r"pid=([[:digit:]]+)", "pid=");
        assert_eq!(r.extract("arch=c000003e pid=1234 auid=0"), "1234");
        assert_eq!(r.extract("arch=c000003e auid=0"), "");
    }

    #[test]
    fn first_match_wins() {
        let r = rule(r"tty=([[:word:]\\/]+)", "tty=");
        assert_eq!(r.extract("tty=pts0 tty=pts1"), "pts0");
        // leftmost, even inside another key
        let r = rule(r"pid=([[:digit:]]+)", "pid=");
        assert_eq!(r.extract("ppid=1 pid=2"), "1");
    }

    #[test]
    fn quotes() {
        let r = rule(r#"exe="(.*?)""#, "exe=");
        assert_eq!(r.extract(r#"comm="cat" exe="/bin/cat" key="x""#), "/bin/cat");
        assert_eq!(r.extract(r#"exe="""#), "");

        // every quote goes, not just the surrounding pair
        let r = rule(r#"msg=(.*)"#, "msg=");
        assert_eq!(r.extract(r#"msg="a"b"c""#), "abc");
        // only a leading quote triggers removal
        assert_eq!(r.extract(r#"msg=a"b""#), r#"a"b""#);
    }

    #[test]
    fn empty_prefix() {
        let r = rule(r"audit\((.*?)\)", "");
        assert_eq!(
            r.extract("type=SYSCALL msg=audit(1364481363.243:24287): arch=c000003e"),
            "audit(1364481363.243:24287)"
        );
    }

    #[test]
    fn prefix_mismatch_is_rejected() {
        for (pattern, prefix) in [
            (r"pid=([[:digit:]]+)", "ppid="),
            (r"[a-z]+=([[:digit:]]+)", "pid="),
            (r"a.b=(.*)", "a.b="),
            (r"pid=([0-9]+)|x", "pid="),
            (r"pid=?([0-9]+)", "pid="),
            (r"(?i)pid=([0-9]+)", "pid="),
        ] {
            match FieldRule::new("test", pattern, prefix, Target::Pid, Assign::Always) {
                Err(RuleError::PrefixMismatch { .. }) => (),
                other => panic!("{pattern} / {prefix}: unexpected {other:?}"),
            }
        }
        for (pattern, prefix) in [
            (r"a\.b=(.*)", "a.b="),
            (r#"exe="(.*?)""#, "exe="),
            (r"(pid=)([0-9]+)", "pid="),
            (r"pid=([0-9]+|x)", "pid="),
            (r"audit\((.*?)\)", ""),
        ] {
            assert!(
                FieldRule::new("test", pattern, prefix, Target::Pid, Assign::Always).is_ok(),
                "{pattern} / {prefix}"
            );
        }
    }

    #[test]
    fn alternation_cannot_shorten_match() {
        let specs = [crate::fields::StepSpec::Extract {
            field: "pid".into(),
            pattern: r"pid=([0-9]+)|x".into(),
            prefix: "pid=".into(),
            target: Target::Pid,
            assign: Assign::IfPresent,
        }];
        assert!(matches!(
            crate::fields::FieldTable::from_specs(&specs),
            Err(RuleError::PrefixMismatch { .. })
        ));
    }

    #[test]
    fn invalid_pattern() {
        assert!(matches!(
            FieldRule::new("test", "pid=(", "pid=", Target::Pid, Assign::Always),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "too long")]
    fn prefix_longer_than_match() {
        let pattern = Regex::new(r"id=[0-9]").unwrap();
        extract(&pattern, "id=1", "id=12345");
    }
}
