//! Emit the verified script: every command with the parameters it ended
//! up with after validation, in the script's own call syntax.

use std::io;
use std::path::Path;

use crate::model::MISSION;
use crate::processor::CompiledEntry;
use crate::processor::ast::{Command, Entry};

pub fn render(entries: &[CompiledEntry]) -> String {
    let mut out = String::new();
    for compiled in entries {
        match &compiled.entry {
            Entry::Command(cmd) if cmd.name == MISSION => inline(&mut out, cmd),
            Entry::Command(cmd) => block(&mut out, cmd),
            Entry::Condition(text) => {
                out.push_str(text);
                out.push_str("\n\n");
            }
        }
    }
    out
}

fn inline(out: &mut String, cmd: &Command) {
    let params: Vec<String> = cmd.params.iter().map(|(k, v)| format!("{k}({v})")).collect();
    out.push_str(&format!("{}({})\n\n", cmd.name, params.join(", ")));
}

fn block(out: &mut String, cmd: &Command) {
    out.push_str(&format!("{}(\n", cmd.name));
    for (k, v) in cmd.params.iter() {
        out.push_str(&format!("    {k}({v}),\n"));
    }
    out.push_str(")\n\n");
}

pub fn emit(entries: &[CompiledEntry], path: &Path) -> io::Result<()> {
    std::fs::write(path, render(entries))
}
