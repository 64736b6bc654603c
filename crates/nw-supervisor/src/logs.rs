use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Read the last `count` lines of the log file.
///
/// The file is streamed once and only the tail window is kept, so large
/// node logs never end up in memory whole.
pub fn tail(path: &Path, count: usize) -> io::Result<Vec<String>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut window = VecDeque::with_capacity(count);
    for line in reader.lines() {
        let line = line?;
        if window.len() == count {
            window.pop_front();
        }
        window.push_back(line);
    }
    Ok(window.into())
}

/// Truncate the log file to empty, keeping the file in place.
pub fn truncate(path: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).truncate(true).open(path)?;
    Ok(())
}
