//! Closed set of analysis kinds a question can be framed as.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Framing of the answer. `None` at call sites means a generic banking
/// assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    CreditRisk,
    FinancialStatements,
    RegulatoryCompliance,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::CreditRisk,
        AnalysisKind::FinancialStatements,
        AnalysisKind::RegulatoryCompliance,
    ];

    /// Wire tag, as accepted in requests.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::CreditRisk => "credit_risk",
            AnalysisKind::FinancialStatements => "financial_statements",
            AnalysisKind::RegulatoryCompliance => "regulatory_compliance",
        }
    }

    /// Parses an optional form field: blank means generic.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, AdvisorError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AdvisorError::InvalidRequest(format!("unknown analysis kind `{s}`")))
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_and_rejects_others() {
        assert_eq!("credit_risk".parse::<AnalysisKind>().unwrap(), AnalysisKind::CreditRisk);
        assert!(matches!(
            "horoscope".parse::<AnalysisKind>(),
            Err(AdvisorError::InvalidRequest(_))
        ));
        assert_eq!(AnalysisKind::parse_optional(Some("  ")).unwrap(), None);
        assert_eq!(
            AnalysisKind::parse_optional(Some("regulatory_compliance")).unwrap(),
            Some(AnalysisKind::RegulatoryCompliance)
        );
    }

    #[test]
    fn serde_uses_wire_tags() {
        for kind in AnalysisKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
