//! Survey-pattern trajectories.
//!
//! Each generator is a pure function of its arguments; the order of the
//! returned waypoints is the order the vehicle travels them.

use std::f64::consts::{PI, TAU};

use tracing::{debug, warn};

use super::ast::{Command, SurveyKind};
use super::coordinates;
use super::geometry::{offset, offset_from, ray_tip, rotate};
use crate::error::{CompileError, Result};
use crate::model::{
    ANGLE, COORDINATES, DECIMATION, DIRECTION, LENGTH, LINES, PASSES, RADIUS, RAY_LENGTH,
    SPACING, TRAJECTORY, Value, WIDTH, Waypoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    CenteredMeander,
    Meander,
    Spiral,
    Star,
    Rosette,
}

/// Dispatch table, highest priority first.
const PATTERNS: &[(Pattern, &str)] = &[
    (Pattern::CenteredMeander, "меандр"),
    (Pattern::Meander, "меандр"),
    (Pattern::Spiral, "спираль"),
    (Pattern::Star, "звезда"),
    (Pattern::Rosette, "розетка"),
    (Pattern::Rosette, "веер"),
];

impl Pattern {
    fn applies_to(self, kind: SurveyKind) -> bool {
        match self {
            Pattern::CenteredMeander => kind == SurveyKind::Point,
            _ => true,
        }
    }

    /// First pattern whose keyword occurs in `keyword`.
    pub fn select(kind: SurveyKind, keyword: &str) -> Option<Pattern> {
        PATTERNS
            .iter()
            .find(|(pattern, kw)| pattern.applies_to(kind) && keyword.contains(kw))
            .map(|(pattern, _)| *pattern)
    }

    pub fn is_meander(self) -> bool {
        matches!(self, Pattern::Meander | Pattern::CenteredMeander)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAxis {
    /// Passes run north, stepping east.
    Vertical,
    /// Passes run east, stepping north.
    Horizontal,
}

/// Waypoints for a survey command, or an empty sequence when its pattern
/// keyword names no known pattern.
pub fn generate(cmd: &Command) -> Result<Vec<Waypoint>> {
    let Some(kind) = cmd.survey_kind() else {
        return Ok(Vec::new());
    };
    let keyword = cmd.pattern_keyword().unwrap_or_default();
    let Some(pattern) = Pattern::select(kind, &keyword) else {
        warn!(command = %cmd.name, %keyword, "no trajectory pattern matches, no waypoints generated");
        return Ok(Vec::new());
    };

    let origin = origin(cmd)?;
    let points = match pattern {
        Pattern::Meander | Pattern::CenteredMeander => {
            let extent = number(cmd, LENGTH, None)?;
            let cross = number(cmd, WIDTH, None)?;
            let spacing = number(cmd, SPACING, None)?;
            let angle = number(cmd, ANGLE, Some(0.0))?;
            let axis = sweep_axis(cmd);
            if pattern == Pattern::Meander {
                meander(origin, extent, cross, spacing, axis, angle)?
            } else {
                centered_meander(origin, extent, cross, spacing, axis, angle)?
            }
        }
        Pattern::Spiral => {
            let max_radius = number(cmd, RADIUS, None)?;
            let spacing = number(cmd, SPACING, None)?;
            let decimation = number(cmd, DECIMATION, Some(1.0))?;
            spiral(origin, max_radius, spacing, is_clockwise(cmd), decimation as i64)?
        }
        Pattern::Star => star(
            origin,
            number(cmd, RADIUS, Some(10.0))?,
            number(cmd, LINES, Some(5.0))? as i64,
            number(cmd, ANGLE, Some(0.0))?,
            number(cmd, RAY_LENGTH, Some(20.0))?,
        )?,
        Pattern::Rosette => rosette(
            origin,
            number(cmd, RADIUS, Some(10.0))?,
            number(cmd, PASSES, Some(6.0))? as i64,
            number(cmd, ANGLE, Some(0.0))?,
        )?,
    };

    debug!(command = %cmd.name, ?pattern, waypoints = points.len(), "trajectory generated");
    Ok(points)
}

fn origin(cmd: &Command) -> Result<Waypoint> {
    let text = match cmd.params.get(COORDINATES) {
        Some(Value::Text(s)) => s,
        Some(other) => {
            return Err(CompileError::Format(format!(
                "`{COORDINATES}` must be a `lon, lat` pair, got `{other}`"
            )));
        }
        None => return Err(CompileError::missing(&cmd.name, COORDINATES)),
    };
    let (lon, lat) = coordinates::parse_pair(text)?;
    Ok(Waypoint::new(lon, lat))
}

fn number(cmd: &Command, key: &str, default: Option<f64>) -> Result<f64> {
    match cmd.params.get(key) {
        None | Some(Value::Null) => default.ok_or_else(|| CompileError::missing(&cmd.name, key)),
        Some(value) => {
            let n = value.as_f64().ok_or_else(|| {
                CompileError::Geometry(format!("`{key}` must be numeric, got `{value}`"))
            })?;
            finite(key, n)
        }
    }
}

/// Upper bound on the waypoints one pattern may produce.
pub const MAX_WAYPOINTS: usize = 100_000;

fn finite(what: &str, x: f64) -> Result<f64> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(CompileError::Geometry(format!("{what} must be finite, got {x}")))
    }
}

fn bounded(pattern: &str, waypoints: f64) -> Result<()> {
    if waypoints > MAX_WAYPOINTS as f64 {
        return Err(CompileError::Geometry(format!(
            "{pattern} would produce {waypoints} waypoints, the limit is {MAX_WAYPOINTS}"
        )));
    }
    Ok(())
}

/// Second comma field of `траектория`; vertical unless it says otherwise.
fn sweep_axis(cmd: &Command) -> SweepAxis {
    let horizontal = cmd
        .params
        .get(TRAJECTORY)
        .and_then(Value::as_text)
        .and_then(|t| t.split(',').nth(1))
        .is_some_and(|axis| axis.trim().to_lowercase().starts_with("горизонт"));
    if horizontal {
        SweepAxis::Horizontal
    } else {
        SweepAxis::Vertical
    }
}

fn is_clockwise(cmd: &Command) -> bool {
    !cmd.params
        .get(DIRECTION)
        .and_then(Value::as_text)
        .is_some_and(|d| d.to_lowercase().contains("против"))
}

fn sweep(
    start: Waypoint,
    extent: f64,
    cross: f64,
    spacing: f64,
    axis: SweepAxis,
) -> Result<Vec<Waypoint>> {
    finite("extent", extent)?;
    finite("cross-extent", cross)?;
    if !(spacing > 0.0) || !spacing.is_finite() {
        return Err(CompileError::Geometry(format!(
            "track spacing must be positive and finite, got {spacing}"
        )));
    }
    let (size, steps) = match axis {
        SweepAxis::Vertical => (extent, cross),
        SweepAxis::Horizontal => (cross, extent),
    };
    let passes = (steps / spacing).floor().max(0.0);
    bounded("meander", 2.0 * (passes + 1.0))?;
    let passes = passes as usize;

    let mut points = Vec::with_capacity(2 * (passes + 1));
    for i in 0..=passes {
        let step = i as f64 * spacing;
        let (near, far) = match axis {
            SweepAxis::Vertical => (
                offset_from(start, 0.0, step),
                offset_from(start, size, step),
            ),
            SweepAxis::Horizontal => (
                offset_from(start, step, 0.0),
                offset_from(start, step, size),
            ),
        };
        // even passes run away from the baseline, odd ones come back
        if i % 2 == 0 {
            points.extend([near, far]);
        } else {
            points.extend([far, near]);
        }
    }
    Ok(points)
}

/// Boustrophedon sweep starting at `start`, optionally rotated about it.
pub fn meander(
    start: Waypoint,
    extent: f64,
    cross: f64,
    spacing: f64,
    axis: SweepAxis,
    angle_deg: f64,
) -> Result<Vec<Waypoint>> {
    finite("rotation angle", angle_deg)?;
    let points = sweep(start, extent, cross, spacing, axis)?;
    Ok(rotate_all(start, points, angle_deg))
}

/// Sweep whose footprint is centered on `center`. A corner that falls on
/// the center itself (zero extents) is not repeated.
pub fn centered_meander(
    center: Waypoint,
    extent: f64,
    cross: f64,
    spacing: f64,
    axis: SweepAxis,
    angle_deg: f64,
) -> Result<Vec<Waypoint>> {
    finite("rotation angle", angle_deg)?;
    let corner = offset(center.lat, center.lon, -extent / 2.0, -cross / 2.0);
    let mut points = sweep(corner, extent, cross, spacing, axis)?;
    if points.first() == Some(&Waypoint::rounded(center.lon, center.lat)) {
        points.remove(0);
    }
    Ok(rotate_all(center, points, angle_deg))
}

fn rotate_all(origin: Waypoint, points: Vec<Waypoint>, angle_deg: f64) -> Vec<Waypoint> {
    if angle_deg == 0.0 {
        return points;
    }
    points
        .into_iter()
        .map(|p| rotate(origin, p, angle_deg))
        .collect()
}

// pi/8 per step
const SPIRAL_STEPS_PER_TURN: f64 = 16.0;

/// Archimedean spiral with `spacing` meters between turns, ending once the
/// radius passes `max_radius`. Every `decimation`-th point is kept; the
/// center always is.
pub fn spiral(
    center: Waypoint,
    max_radius: f64,
    spacing: f64,
    clockwise: bool,
    decimation: i64,
) -> Result<Vec<Waypoint>> {
    finite("spiral radius", max_radius)?;
    let growth = spacing / SPIRAL_STEPS_PER_TURN;
    if !(growth > 0.0) || !spacing.is_finite() {
        return Err(CompileError::Geometry(format!(
            "spiral spacing must be positive and finite, got {spacing}"
        )));
    }
    bounded("spiral", (max_radius / growth).floor() + 2.0)?;
    if decimation < 1 {
        return Err(CompileError::Geometry(format!(
            "decimation factor must be at least 1, got {decimation}"
        )));
    }

    let direction = if clockwise { -1.0 } else { 1.0 };
    let mut points = vec![Waypoint::rounded(center.lon, center.lat)];
    let mut radius = 0.0;
    let mut step: i64 = 0;
    while radius <= max_radius {
        radius += growth;
        step += 1;
        if step % decimation != 0 {
            continue;
        }
        let angle = direction * TAU * radius / spacing;
        let (sin_a, cos_a) = angle.sin_cos();
        points.push(offset_from(center, radius * sin_a, radius * cos_a));
    }
    Ok(points)
}

/// Hub-and-spoke star: every ray returns to the center before the next.
pub fn star(
    center: Waypoint,
    inner_radius: f64,
    num_lines: i64,
    angle_offset_deg: f64,
    line_length: f64,
) -> Result<Vec<Waypoint>> {
    if num_lines < 2 {
        return Err(CompileError::Geometry(format!(
            "a star needs at least 2 rays, got {num_lines}"
        )));
    }
    bounded("star", num_lines as f64 * 3.0)?;
    finite("inner radius", inner_radius)?;
    finite("ray length", line_length)?;
    finite("angle offset", angle_offset_deg)?;
    let angle_step = TAU / num_lines as f64;
    let base = angle_offset_deg.to_radians();

    let mut points = Vec::new();
    for i in 0..num_lines {
        let angle = base + i as f64 * angle_step;
        points.push(ray_tip(center, line_length, angle));
        if inner_radius > 0.0 {
            points.push(ray_tip(center, inner_radius, angle + angle_step / 2.0));
        }
        points.push(center);
    }
    Ok(round_all(points))
}

/// `num_passes` rays spread over half a turn, each followed by the center.
pub fn rosette(
    center: Waypoint,
    radius: f64,
    num_passes: i64,
    angle_offset_deg: f64,
) -> Result<Vec<Waypoint>> {
    if num_passes < 1 {
        return Err(CompileError::Geometry(format!(
            "a rosette needs at least 1 pass, got {num_passes}"
        )));
    }
    bounded("rosette", num_passes as f64 * 2.0)?;
    finite("radius", radius)?;
    finite("angle offset", angle_offset_deg)?;
    let angle_step = PI / num_passes as f64;
    let base = angle_offset_deg.to_radians();

    let points = (0..num_passes)
        .flat_map(|i| [ray_tip(center, radius, base + i as f64 * angle_step), center])
        .collect();
    Ok(round_all(points))
}

fn round_all(points: Vec<Waypoint>) -> Vec<Waypoint> {
    points
        .into_iter()
        .map(|p| Waypoint::rounded(p.lon, p.lat))
        .collect()
}
