use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The forecast target: weekly incident cases or deaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Cases,
    Death,
}

impl Target {
    /// Key used in source files and series ids.
    pub fn key(&self) -> &'static str {
        match self {
            Target::Cases => "cases",
            Target::Death => "death",
        }
    }

    /// Human-readable label for axes and tooltips.
    pub fn label(&self) -> &'static str {
        match self {
            Target::Cases => "Cases",
            Target::Death => "Deaths",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Target {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cases" | "case" | "inc case" => Ok(Target::Cases),
            "death" | "deaths" | "inc death" => Ok(Target::Death),
            other => Err(RecordError::UnknownTarget(other.to_string())),
        }
    }
}

/// A parsed target column such as `"2 wk ahead inc death"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescription {
    /// Weeks ahead of the reference date; zero or negative for nowcasts.
    pub horizon_weeks: i32,
    pub target: Target,
}

impl FromStr for TargetDescription {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || RecordError::UnknownTarget(s.to_string());
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [ahead, unit, "ahead", "inc", value_type] = tokens.as_slice() else {
            return Err(unknown());
        };
        if *unit != "wk" || ahead.trim_start_matches('-').len() > 3 {
            return Err(unknown());
        }
        let horizon_weeks = ahead.parse::<i32>().map_err(|_| unknown())?;
        let target = match *value_type {
            "case" => Target::Cases,
            "death" => Target::Death,
            _ => return Err(unknown()),
        };
        Ok(TargetDescription {
            horizon_weeks,
            target,
        })
    }
}
