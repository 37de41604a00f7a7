//! Geographic coordinate text → signed decimal degrees.
//!
//! Accepted per axis: `-10.5`, `10.5 ВД`, `N 20.5`, `10.5°E`, `10.5* ВД`,
//! `10°30'15" N`, `10°30′15″ СШ`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CompileError, Result};

static DMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(-)?\s*(\d+(?:\.\d*)?|\.\d+)\s*[°*]?\s*(?:(\d+(?:\.\d*)?)\s*['′])?\s*(?:(\d+(?:\.\d*)?)\s*["″])?$"#,
    )
    .expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

// tried in order; Cyrillic markers before Latin ones
const MARKERS: &[(&str, f64, Axis)] = &[
    ("СШ", 1.0, Axis::Latitude),
    ("ЮШ", -1.0, Axis::Latitude),
    ("ВД", 1.0, Axis::Longitude),
    ("ЗД", -1.0, Axis::Longitude),
    ("N", 1.0, Axis::Latitude),
    ("S", -1.0, Axis::Latitude),
    ("E", 1.0, Axis::Longitude),
    ("W", -1.0, Axis::Longitude),
];

/// One parsed coordinate and the axis its hemisphere marker names, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub degrees: f64,
    pub axis: Option<Axis>,
}

pub fn parse_coordinate(text: &str) -> Result<Coordinate> {
    let upper = text.trim().to_uppercase();
    let mut sign = 1.0;
    let mut axis = None;
    let mut body = upper.clone();
    for &(marker, s, a) in MARKERS {
        if let Some(stripped) = strip_marker(&upper, marker) {
            sign = s;
            axis = Some(a);
            body = stripped;
            break;
        }
    }

    let caps = DMS
        .captures(body.trim())
        .ok_or_else(|| CompileError::Format(format!("invalid coordinate format: `{text}`")))?;

    let part = |i: usize| -> f64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0)
    };
    let (degrees, minutes, seconds) = (part(2), part(3), part(4));
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(CompileError::Format(format!(
            "minutes and seconds must be below 60: `{text}`"
        )));
    }
    if caps.get(1).is_some() {
        sign = -sign;
    }

    Ok(Coordinate {
        degrees: sign * (degrees + minutes / 60.0 + seconds / 3600.0),
        axis,
    })
}

/// Removes a hemisphere marker standing at either end of the text.
fn strip_marker(text: &str, marker: &str) -> Option<String> {
    text.strip_suffix(marker)
        .or_else(|| text.strip_prefix(marker))
        .map(|rest| rest.trim().to_string())
}

/// Parses `"lon, lat"` into `(lon, lat)`.
///
/// Positional order applies unless the hemisphere markers say the pair
/// was written latitude first.
pub fn parse_pair(text: &str) -> Result<(f64, f64)> {
    let (first, second) = text
        .split_once(',')
        .ok_or_else(|| CompileError::Format(format!("expected `lon, lat`, got `{text}`")))?;
    let a = parse_coordinate(first)?;
    let b = parse_coordinate(second)?;
    if a.axis.is_some() && a.axis == b.axis {
        return Err(CompileError::Format(format!(
            "both coordinates name the same axis: `{text}`"
        )));
    }

    let (lon, lat) = match (a.axis, b.axis) {
        (Some(Axis::Latitude), _) | (_, Some(Axis::Longitude)) => (b.degrees, a.degrees),
        _ => (a.degrees, b.degrees),
    };

    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(CompileError::Format(format!(
            "coordinates out of range: `{text}`"
        )));
    }
    Ok((lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_coordinate_formats() {
        let test_cases = vec![
            ("10.0 ВД", 10.0),
            ("20.5 СШ", 20.5),
            ("10.5 зд", -10.5),
            ("-33.25", -33.25),
            ("N 45", 45.0),
            ("10.5°E", 10.5),
            ("12.5* ЮШ", -12.5),
            ("10°30'0\" N", 10.5),
            ("10°30′36″ СШ", 10.51),
            ("59°56'S", -(59.0 + 56.0 / 60.0)),
        ];

        for (text, expected) in test_cases {
            let c = parse_coordinate(text).unwrap();
            assert!(close(c.degrees, expected), "{text}: {}", c.degrees);
        }
    }

    #[test]
    fn test_invalid_coordinates() {
        for text in ["", "ВД", "север", "10°75' N", "1.2.3 E"] {
            assert!(
                matches!(parse_coordinate(text), Err(CompileError::Format(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn test_pair_order() {
        assert_eq!(parse_pair("10.0 ВД, 20.0 СШ").unwrap(), (10.0, 20.0));
        assert_eq!(parse_pair("20.0 СШ, 10.0 ВД").unwrap(), (10.0, 20.0));
        assert_eq!(parse_pair("30.5, 59.9").unwrap(), (30.5, 59.9));
    }

    #[test]
    fn test_pair_out_of_range() {
        assert!(parse_pair("10, 95").is_err());
        assert!(parse_pair("10").is_err());
    }

    #[test]
    fn test_pair_with_one_axis_twice() {
        for text in ["10 ВД, 20 ВД", "20 СШ, 30 N", "E 10, W 20"] {
            assert!(
                matches!(parse_pair(text), Err(CompileError::Format(_))),
                "{text}"
            );
        }
    }
}
