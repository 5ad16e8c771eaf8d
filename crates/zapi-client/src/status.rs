//! ZAPI execution status codes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Execution status as understood by ZAPI.
///
/// The integer codes are a contract with the remote system and are passed
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Pass,
    Fail,
    InProgress,
    Block,
    Unexecuted,
}

impl ExecutionStatus {
    pub const ALL: [ExecutionStatus; 5] = [
        ExecutionStatus::Pass,
        ExecutionStatus::Fail,
        ExecutionStatus::InProgress,
        ExecutionStatus::Block,
        ExecutionStatus::Unexecuted,
    ];

    /// Wire code sent in the `status` field.
    pub fn code(self) -> i32 {
        match self {
            ExecutionStatus::Pass => 1,
            ExecutionStatus::Fail => 2,
            ExecutionStatus::InProgress => 3,
            ExecutionStatus::Block => 4,
            ExecutionStatus::Unexecuted => -1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::Pass => "PASS",
            ExecutionStatus::Fail => "FAIL",
            ExecutionStatus::InProgress => "IN_PROGRESS",
            ExecutionStatus::Block => "BLOCK",
            ExecutionStatus::Unexecuted => "UNEXECUTED",
        };
        f.write_str(s)
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    /// Accepts names (`pass`, `in-progress`, `IN_PROGRESS`, ...) or wire codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown status code {}", code));
        }
        match trimmed.to_ascii_lowercase().replace('-', "_").as_str() {
            "pass" | "passed" => Ok(ExecutionStatus::Pass),
            "fail" | "failed" => Ok(ExecutionStatus::Fail),
            "in_progress" | "wip" => Ok(ExecutionStatus::InProgress),
            "block" | "blocked" => Ok(ExecutionStatus::Block),
            "unexecuted" => Ok(ExecutionStatus::Unexecuted),
            other => Err(format!(
                "unknown execution status '{}' (expected pass, fail, in-progress, block, unexecuted or a code)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        assert_eq!(ExecutionStatus::Pass.code(), 1);
        assert_eq!(ExecutionStatus::Fail.code(), 2);
        assert_eq!(ExecutionStatus::InProgress.code(), 3);
        assert_eq!(ExecutionStatus::Block.code(), 4);
        assert_eq!(ExecutionStatus::Unexecuted.code(), -1);
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!("pass".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Pass));
        assert_eq!(
            "In-Progress".parse::<ExecutionStatus>(),
            Ok(ExecutionStatus::InProgress)
        );
        assert_eq!("-1".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Unexecuted));
        assert_eq!("4".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Block));
        assert!("7".parse::<ExecutionStatus>().is_err());
        assert!("skipped".parse::<ExecutionStatus>().is_err());
    }
}
