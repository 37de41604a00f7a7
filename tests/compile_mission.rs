use std::fs;
use std::path::Path;

use mission_compiler::error::CompileError;
use mission_compiler::model::{HEIGHT, MAX_TIME, NO_LINK_TIME, Value};
use mission_compiler::parser::{load_rules, load_rules_file, load_script};
use mission_compiler::processor::ast::Entry;
use mission_compiler::processor::compile;
use mission_compiler::processor::validator::Decline;
use mission_compiler::writer;

fn task_ids(json: &serde_json::Value) -> Vec<&str> {
    json["mission::Plan"]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect()
}

#[test]
fn compiles_sample_mission() {
    let lines = load_script(Path::new("tests/mission.yappi")).unwrap();
    let rules = load_rules_file(Path::new("tests/parameters.json")).unwrap();
    let compiled = compile(&lines, &rules, &mut Decline).expect("valid mission");

    // миссия, figure survey, condition, point survey, line survey
    assert_eq!(compiled.entries.len(), 5);
    assert!(matches!(compiled.entries[2].entry, Entry::Condition(_)));

    let mission = compiled.entries[0].entry.as_command().unwrap();
    assert_eq!(mission.params.get(NO_LINK_TIME), Some(&Value::Integer(60)));
    assert_eq!(mission.params.get(MAX_TIME), Some(&Value::Integer(3600)));

    // depth variable folded into a negative height
    let figure = compiled.entries[1].entry.as_command().unwrap();
    assert_eq!(figure.params.get(HEIGHT), Some(&Value::Number(-5.0)));
    assert_eq!(compiled.entries[1].waypoints.len(), 6);

    // 3 rosette passes, each returning to the center
    assert_eq!(compiled.entries[3].waypoints.len(), 6);
    assert!(compiled.entries[4].waypoints.is_empty());

    let json: serde_json::Value =
        serde_json::from_slice(&writer::json::render(&compiled.plan).unwrap()).unwrap();
    let ids = task_ids(&json);
    assert_eq!(ids.len(), 14 + 8);
    assert_eq!(ids[0], "SidesonarOn");
    assert_eq!(ids[13], "SidesonarOff");
    assert_eq!(ids[14], "MBEOnHf");
    assert_eq!(ids[21], "MBEOff");
    assert_eq!(ids.iter().filter(|id| **id == "TackPoint").count(), 12);

    let first_move = &json["mission::Plan"]["tasks"][1];
    assert_eq!(first_move["TackPointUp"], -5.0);
    assert_eq!(first_move["TackPointVelocity"], 1.5);
}

#[test]
fn writes_both_artifacts() {
    let lines = load_script(Path::new("tests/mission.yappi")).unwrap();
    let rules = load_rules_file(Path::new("tests/parameters.json")).unwrap();
    let compiled = compile(&lines, &rules, &mut Decline).unwrap();

    let dir = std::env::temp_dir().join(format!("mission-compiler-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let plan_path = dir.join("mission.json");
    let listing_path = dir.join("verification.yappi");

    writer::json::emit(&compiled.plan, &plan_path).unwrap();
    writer::script::emit(&compiled.entries, &listing_path).unwrap();

    let plan: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&plan_path).unwrap()).unwrap();
    assert_eq!(plan["mission::Plan"]["name"], "Mission");

    let listing = fs::read_to_string(&listing_path).unwrap();
    assert!(listing.starts_with("миссия(имя(тест), время_без_связи(60), максимальное_время(3600))\n\n"));
    assert!(listing.contains("обследование_фигуры(\n"));
    assert!(listing.contains("    высота(-5.0),\n"));
    assert!(listing.contains("событие(потеря_связи)\n\n"));
    assert!(!listing.contains("глубина("));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_parameter_is_reported_not_invented() {
    let rules = load_rules_file(Path::new("tests/parameters.json")).unwrap();
    let lines = ["обследование_точки(высота(5), скорость(1), траектория(спираль))"];
    let err = compile(&lines, &rules, &mut Decline).unwrap_err();
    assert!(matches!(err, CompileError::Validation { .. }), "{err}");
}

#[test]
fn operator_answers_fill_the_gaps() {
    let rules = load_rules_file(Path::new("tests/parameters.json")).unwrap();
    let lines = ["обследование_точки(высота(5), скорость(1), траектория(спираль))"];
    let mut answers = |_: &str, param: &str| -> Result<Value, String> {
        match param {
            "радиус" => Ok(Value::text("20")),
            "межгалс" => Ok(Value::text("10")),
            "координаты" => Ok(Value::text("30.0 ВД, 60.0 СШ")),
            other => Err(format!("unexpected question about {other}")),
        }
    };
    let compiled = compile(&lines, &rules, &mut answers).unwrap();
    let waypoints = &compiled.entries[0].waypoints;
    assert!(waypoints.len() > 1);
    assert_eq!((waypoints[0].lon, waypoints[0].lat), (30.0, 60.0));
}

#[test]
fn broken_rule_set_is_a_resource_error() {
    assert!(matches!(
        load_rules("{ \"Required\": [] }"),
        Err(CompileError::Resource(_))
    ));
}
