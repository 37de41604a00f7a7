//! Lowers validated survey commands into the device action sequence.
//!
//! Every survey block is bracketed by instrument ON/OFF. Area sweeps
//! (figure surveys and point-survey meanders) pause and resume the
//! instrument on alternate waypoints so that turns are not recorded.

use serde::Serialize;
use tracing::{info, warn};

use super::ast::{Command, SurveyKind};
use super::trajectory::Pattern;
use crate::error::{CompileError, Result, ValidationIssue};
use crate::model::{DEVICE, HEIGHT, ParamType, SPEED, Value, Waypoint};

/// One firmware-level instruction, tagged by its `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "id")]
pub enum DeviceAction {
    #[serde(rename = "TackPoint")]
    Movement {
        /// Vertical offset; negative is below the reference.
        #[serde(rename = "TackPointUp")]
        up: f64,
        #[serde(rename = "TackPointVelocity")]
        velocity: f64,
        #[serde(rename = "TackPointLon")]
        lon: f64,
        #[serde(rename = "TackPointLat")]
        lat: f64,
    },
    #[serde(rename_all = "PascalCase")]
    SidesonarOn {
        sidesonar_dist: u32,
        sidesonar_pulse: u32,
        sidesonar_decimation: u32,
        sidesonar_raw_data: bool,
    },
    SidesonarPause,
    SidesonarResume,
    SidesonarOff,
    #[serde(rename = "MBEOnHf")]
    MbeOnHf,
    #[serde(rename = "MBEPause")]
    MbePause,
    #[serde(rename = "MBEOff")]
    MbeOff,
    #[serde(rename_all = "PascalCase")]
    PhotoOn {
        photo_period: u32,
        photo_light: u32,
        photo_exposure: u32,
        photo_gain: u32,
        photo_auto: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    On,
    Pause,
    Resume,
    Off,
}

/// Fixed (device, status) lookup. `None` for pairs the firmware does not
/// define, e.g. multibeam resume.
pub fn instrument(device: &str, status: Status) -> Option<DeviceAction> {
    let action = match (device, status) {
        ("гбо", Status::On) => DeviceAction::SidesonarOn {
            sidesonar_dist: 100,
            sidesonar_pulse: 1500,
            sidesonar_decimation: 1,
            sidesonar_raw_data: false,
        },
        ("гбо", Status::Pause) => DeviceAction::SidesonarPause,
        ("гбо", Status::Resume) => DeviceAction::SidesonarResume,
        ("гбо", Status::Off) => DeviceAction::SidesonarOff,
        ("млэ", Status::On) => DeviceAction::MbeOnHf,
        ("млэ", Status::Pause) => DeviceAction::MbePause,
        ("млэ", Status::Off) => DeviceAction::MbeOff,
        ("фотокамера", Status::On) => DeviceAction::PhotoOn {
            photo_period: 2,
            photo_light: 100,
            photo_exposure: 7000,
            photo_gain: 1,
            photo_auto: "true".to_string(),
        },
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionPlan {
    pub name: String,
    pub note: String,
    pub tasks: Vec<DeviceAction>,
}

/// Accumulates actions block by block, in source order.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    tasks: Vec<DeviceAction>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the block for one command; non-survey commands and line
    /// surveys add nothing.
    pub fn push(&mut self, cmd: &Command, waypoints: &[Waypoint]) -> Result<()> {
        let toggling = match cmd.survey_kind() {
            Some(SurveyKind::Figure) => true,
            Some(SurveyKind::Point) => cmd
                .pattern_keyword()
                .and_then(|kw| Pattern::select(SurveyKind::Point, &kw))
                .is_some_and(Pattern::is_meander),
            Some(SurveyKind::Line) | None => return Ok(()),
        };

        let device = device(cmd)?;
        let up = numeric(cmd, HEIGHT)?;
        let velocity = numeric(cmd, SPEED)?;

        self.instrument(device, Status::On);
        let mut paused = false;
        for wp in waypoints {
            self.tasks.push(DeviceAction::Movement {
                up,
                velocity,
                lon: wp.lon,
                lat: wp.lat,
            });
            if toggling {
                let status = if paused { Status::Resume } else { Status::Pause };
                self.instrument(device, status);
                paused = !paused;
            }
        }
        self.instrument(device, Status::Off);
        Ok(())
    }

    fn instrument(&mut self, device: &str, status: Status) {
        match instrument(device, status) {
            Some(action) => self.tasks.push(action),
            None => warn!(device, ?status, "no device action defined, skipped"),
        }
    }

    pub fn finish(self, name: &str, note: &str) -> MissionPlan {
        info!(tasks = self.tasks.len(), "mission plan assembled");
        MissionPlan {
            name: name.to_string(),
            note: note.to_string(),
            tasks: self.tasks,
        }
    }
}

fn device(cmd: &Command) -> Result<&str> {
    match cmd.params.get(DEVICE) {
        Some(Value::Text(s)) => Ok(s.trim()),
        Some(other) => Err(CompileError::validation(
            &cmd.name,
            ValidationIssue::Coercion {
                parameter: DEVICE.to_string(),
                value: other.to_string(),
                expected: "device name",
            },
        )),
        None => Err(CompileError::missing(&cmd.name, DEVICE)),
    }
}

fn numeric(cmd: &Command, key: &str) -> Result<f64> {
    let value = cmd
        .params
        .get(key)
        .ok_or_else(|| CompileError::missing(&cmd.name, key))?;
    value.as_f64().ok_or_else(|| {
        CompileError::validation(
            &cmd.name,
            ValidationIssue::Coercion {
                parameter: key.to_string(),
                value: value.to_string(),
                expected: ParamType::Float.name(),
            },
        )
    })
}
