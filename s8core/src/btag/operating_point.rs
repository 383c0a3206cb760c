use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// b-tag discriminant channels carried by every jet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tagger {
    /// Track counting, high efficiency.
    Tche,
    /// Track counting, high purity.
    Tchp,
}

impl Tagger {
    pub fn to_str(&self) -> &str {
        match self {
            Tagger::Tche => "TCHE",
            Tagger::Tchp => "TCHP",
        }
    }
}

impl Display for Tagger {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Track counting working points (CMS, 2010 calibration).
pub fn operating_point_thresholds() -> HashMap<&'static str, f64> {
    let mut map = HashMap::new();
    map.insert("TCHEL", 1.7);
    map.insert("TCHEM", 3.3);
    map.insert("TCHET", 10.2);
    map.insert("TCHPL", 1.19);
    map.insert("TCHPM", 1.93);
    map.insert("TCHPT", 3.41);
    map
}

/// A named discriminant threshold. A jet is tagged when its score is
/// strictly above the threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperatingPoint {
    label: String,
    threshold: f64,
}

impl OperatingPoint {
    /// Parses a working point label such as `TCHEM` or `tchpl`.
    ///
    /// # Examples
    ///
    /// ```
    /// use s8core::btag::operating_point::OperatingPoint;
    ///
    /// let op = OperatingPoint::parse("TCHEM").unwrap();
    /// assert_eq!(op.threshold(), 3.3);
    /// assert!(op.is_tagged(3.31));
    /// assert!(!op.is_tagged(3.3));
    /// assert!(OperatingPoint::parse("CSVM").is_err());
    /// ```
    pub fn parse(label: &str) -> Result<Self> {
        let pattern = Regex::new(r"^(?i)(TCHE|TCHP)([LMT])$").unwrap();
        let captures = pattern
            .captures(label.trim())
            .ok_or_else(|| Error::UnknownOperatingPoint(label.to_string()))?;

        let normalized = format!("{}{}", &captures[1], &captures[2]).to_uppercase();
        let threshold = operating_point_thresholds()
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| Error::UnknownOperatingPoint(label.to_string()))?;

        Ok(OperatingPoint { label: normalized, threshold })
    }

    pub(crate) fn named(label: &str, threshold: f64) -> Self {
        OperatingPoint { label: label.to_string(), threshold }
    }

    /// An unnamed operating point at an explicit threshold.
    pub fn from_threshold(threshold: f64) -> Self {
        OperatingPoint { label: String::new(), threshold }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Tagger encoded in the label, `None` for unnamed thresholds.
    pub fn tagger(&self) -> Option<Tagger> {
        if self.label.starts_with("TCHE") {
            Some(Tagger::Tche)
        } else if self.label.starts_with("TCHP") {
            Some(Tagger::Tchp)
        } else {
            None
        }
    }

    /// Strict comparison: a score equal to the threshold is not tagged.
    pub fn is_tagged(&self, score: f64) -> bool {
        self.threshold < score
    }
}

impl Default for OperatingPoint {
    fn default() -> Self {
        OperatingPoint::named("TCHEM", 3.3)
    }
}

impl FromStr for OperatingPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OperatingPoint::parse(s)
    }
}

impl TryFrom<String> for OperatingPoint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        OperatingPoint::parse(&value)
    }
}

impl From<OperatingPoint> for String {
    fn from(op: OperatingPoint) -> Self {
        op.label
    }
}

impl Display for OperatingPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.threshold)
        } else {
            write!(f, "{} ({})", self.label, self.threshold)
        }
    }
}
