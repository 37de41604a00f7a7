//! The functional core: analysis → validation → trajectories → plan.
//!
//! Commands are handled strictly one after another; the variable table
//! filled during analysis is the only state shared between them.
pub mod ast;
pub mod coordinates;
pub mod expr;
pub mod geometry;
pub mod lexer;
pub mod plan;
pub mod script_parser;
pub mod trajectory;
pub mod validator;
pub mod variables;

use tracing::info;

use crate::error::Result;
use crate::model::{RuleSet, Waypoint};
use ast::Entry;
use plan::{MissionPlan, PlanBuilder};
use validator::{Validator, ValueResolver};

pub const PLAN_NAME: &str = "Mission";
pub const PLAN_NOTE: &str = "Описание миссии";

/// A validated entry and the waypoints generated for it (empty for
/// anything that is not a survey).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEntry {
    pub entry: Entry,
    pub waypoints: Vec<Waypoint>,
}

/// Read-only result handed to the writers.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub entries: Vec<CompiledEntry>,
    pub plan: MissionPlan,
}

/// Compiles pre-processed script lines into a mission plan.
pub fn compile<S: AsRef<str>>(
    lines: &[S],
    rules: &RuleSet,
    resolver: &mut dyn ValueResolver,
) -> Result<Compiled> {
    let analyzed = script_parser::analyze(lines)?;
    let validator = Validator::new(rules);

    let mut builder = PlanBuilder::new();
    let mut entries = Vec::with_capacity(analyzed.len());
    for entry in analyzed {
        let (entry, waypoints) = match entry {
            Entry::Command(cmd) => {
                let cmd = validator.validate_command(cmd, resolver)?;
                let waypoints = trajectory::generate(&cmd)?;
                builder.push(&cmd, &waypoints)?;
                (Entry::Command(cmd), waypoints)
            }
            cond @ Entry::Condition(_) => (cond, Vec::new()),
        };
        entries.push(CompiledEntry { entry, waypoints });
    }

    info!(entries = entries.len(), "compilation finished");
    Ok(Compiled {
        entries,
        plan: builder.finish(PLAN_NAME, PLAN_NOTE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::model::{HEIGHT, POINT_SURVEY};
    use validator::Decline;

    fn rules() -> RuleSet {
        let mut rules = RuleSet::default();
        rules
            .required
            .insert(POINT_SURVEY.into(), vec![HEIGHT.into()]);
        rules
    }

    #[test]
    fn test_point_survey_meander_end_to_end() {
        let lines = vec![
            "обследование_точки(прибор(гбо), высота(5), скорость(1), координаты(10.0 ВД, 20.0 СШ), траектория(меандр, вертикально), длина(20), ширина(10), межгалс(5))",
        ];
        let compiled = compile(&lines, &rules(), &mut Decline).unwrap();

        assert_eq!(compiled.entries.len(), 1);
        assert_eq!(compiled.entries[0].waypoints.len(), 6);
        // ON + 6 × (movement + toggle) + OFF
        assert_eq!(compiled.plan.tasks.len(), 14);
        assert_eq!(compiled.plan.name, PLAN_NAME);
    }

    #[test]
    fn test_missing_required_height_fails_without_resolver() {
        let lines = vec!["обследование_точки(прибор(гбо), траектория(звезда))"];
        let err = compile(&lines, &rules(), &mut Decline).unwrap_err();
        assert!(matches!(err, CompileError::Validation { .. }), "{err}");
    }

    #[test]
    fn test_conditions_carry_no_waypoints() {
        let lines = vec!["событие(потеря_связи)", "всплытие(скорость(1))"];
        let compiled = compile(&lines, &RuleSet::default(), &mut Decline).unwrap();
        assert_eq!(compiled.entries.len(), 2);
        assert!(matches!(compiled.entries[0].entry, Entry::Condition(_)));
        assert!(compiled.entries.iter().all(|e| e.waypoints.is_empty()));
        assert!(compiled.plan.tasks.is_empty());
    }
}
