//! Emit the mission plan as the JSON document the vehicle loads.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::processor::plan::MissionPlan;

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "mission::Plan")]
    plan: &'a MissionPlan,
}

/// Pretty-printed with a four-space indent; non-ASCII text is kept as is.
pub fn render(plan: &MissionPlan) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    Document { plan }.serialize(&mut ser)?;
    Ok(buf)
}

pub fn emit(plan: &MissionPlan, path: &Path) -> io::Result<()> {
    let bytes = render(plan)?;
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&bytes)?;
    out.flush()
}
