use anyhow::Result;
use serde_json::Value;
use std::io::Write;

/// Writes a response as pretty-printed JSON to stdout.
pub fn print_json(value: &Value) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, value)
}

pub fn write_json<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}
