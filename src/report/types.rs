use crate::comment::ParsedComment;

/// How urgent a bot comment looks, judged from its issue-type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Info,
    Refactor,
    Issue,
}

impl Urgency {
    pub fn from_issue_type(issue_type: Option<&str>) -> Self {
        let Some(label) = issue_type.map(str::to_lowercase) else {
            return Urgency::Info;
        };
        if label.contains("issue") || label.contains("critical") {
            Urgency::Issue
        } else if label.contains("refactor") || label.contains("suggestion") {
            Urgency::Refactor
        } else {
            Urgency::Info
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Info => write!(f, "INFO"),
            Urgency::Refactor => write!(f, "REFACTOR"),
            Urgency::Issue => write!(f, "ISSUE"),
        }
    }
}

/// Summary of one parsing run, ready to show to a person or an agent.
#[derive(Debug)]
pub struct Report {
    /// What was parsed (PR reference or file path)
    pub title: String,
    /// Comments received from the source
    pub total_comments: usize,
    /// Comments attributed to the review bot
    pub bot_comments: usize,
    /// Bot comments that could not be parsed
    pub failures: usize,
    /// Actionable comments, in source order
    pub actionable: Vec<ParsedComment>,
    /// Highest urgency across actionable comments
    pub top_urgency: Urgency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::Info < Urgency::Refactor);
        assert!(Urgency::Refactor < Urgency::Issue);
    }

    #[test]
    fn test_urgency_from_issue_type() {
        assert_eq!(Urgency::from_issue_type(Some("Potential issue")), Urgency::Issue);
        assert_eq!(Urgency::from_issue_type(Some("Refactor suggestion")), Urgency::Refactor);
        assert_eq!(Urgency::from_issue_type(Some("Verification agent")), Urgency::Info);
        assert_eq!(Urgency::from_issue_type(None), Urgency::Info);
    }

    #[test]
    fn test_urgency_display() {
        assert_eq!(Urgency::Issue.to_string(), "ISSUE");
    }
}
