//! Structured form of one script statement, after analysis and before
//! it is lowered to device actions.

use crate::model::{FIGURE_SURVEY, LINE_SURVEY, POINT_SURVEY, Params, TRAJECTORY, Value};

/// `name(key(value), …)` with its parameters pulled apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub params: Params,
}

impl Command {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn survey_kind(&self) -> Option<SurveyKind> {
        SurveyKind::from_name(&self.name)
    }

    /// Lower-cased pattern keyword: the `траектория` text before the first comma.
    pub fn pattern_keyword(&self) -> Option<String> {
        let pattern = match self.params.get(TRAJECTORY)? {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        };
        let keyword = pattern.split(',').next().unwrap_or_default();
        Some(keyword.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Command(Command),
    /// `событие …` block, kept verbatim for handling outside the compiler core.
    Condition(String),
}

impl Entry {
    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Entry::Command(cmd) => Some(cmd),
            Entry::Condition(_) => None,
        }
    }
}

/// Command kinds that expand into a waypoint sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyKind {
    /// `обследование_фигуры` – sweep an area from its corner.
    Figure,
    /// `обследование_точки` – survey around a center point.
    Point,
    /// `обследование_линии`
    Line,
}

impl SurveyKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            FIGURE_SURVEY => Some(SurveyKind::Figure),
            POINT_SURVEY => Some(SurveyKind::Point),
            LINE_SURVEY => Some(SurveyKind::Line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_keyword_is_lowercased_head() {
        let mut params = Params::new();
        params.insert(TRAJECTORY, Value::text("Меандр, вертикально"));
        let cmd = Command::new(POINT_SURVEY, params);

        assert_eq!(cmd.pattern_keyword().as_deref(), Some("меандр"));
        assert_eq!(cmd.survey_kind(), Some(SurveyKind::Point));
    }

    #[test]
    fn test_non_survey_commands_have_no_kind() {
        let cmd = Command::new("миссия", Params::new());
        assert_eq!(cmd.survey_kind(), None);
        assert_eq!(cmd.pattern_keyword(), None);
    }
}
