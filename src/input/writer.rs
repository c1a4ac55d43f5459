use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::recording::Event;

/// Write events as JSON lines to any writer
pub fn write_events<W: Write>(writer: &mut W, events: &[Event]) -> Result<()> {
    for event in events {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write events as JSON lines to a file, replacing it
pub fn save_events<P: AsRef<Path>>(path: P, events: &[Event]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_events(&mut writer, events)
}
