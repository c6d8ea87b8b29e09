use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::Path,
};

use log::debug;

use crate::{NetErr, Result, training::Sample};

/// A lazy iterator over the samples of a labeled CSV file.
///
/// Every line holds the class index in its first column and the sample values in the rest,
/// blank lines are skipped.
pub struct CsvSamples<R> {
    lines: Lines<R>,
    line: usize,
}

impl CsvSamples<BufReader<File>> {
    /// Opens a CSV file for reading.
    ///
    /// # Arguments
    /// * `path` - The file to read.
    /// * `skip_header` - Whether the first line holds column names instead of a sample.
    ///
    /// # Returns
    /// A new `CsvSamples` or `NetErr::Io` if the file can't be opened.
    pub fn open<P: AsRef<Path>>(path: P, skip_header: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!("reading samples from {}", path.display());

        Self::from_reader(BufReader::new(file), skip_header)
    }
}

impl<R: BufRead> CsvSamples<R> {
    /// Creates a new `CsvSamples` reading from any buffered source.
    pub fn from_reader(reader: R, skip_header: bool) -> Result<Self> {
        let mut lines = reader.lines();
        let mut line = 0;

        if skip_header {
            lines.next().transpose()?;
            line += 1;
        }

        Ok(Self { lines, line })
    }
}

impl<R: BufRead> Iterator for CsvSamples<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            let text = text.trim();
            if !text.is_empty() {
                return Some(parse_sample(self.line, text));
            }
        }
    }
}

fn parse_sample(line: usize, text: &str) -> Result<Sample> {
    let mut columns = text.split(',').map(str::trim);

    let label = columns.next().unwrap_or_default();
    let class = label.parse().map_err(|e| NetErr::Parse {
        line,
        msg: format!("invalid label '{label}': {e}"),
    })?;

    let values = columns
        .map(|v| {
            v.parse().map_err(|e| NetErr::Parse {
                line,
                msg: format!("invalid value '{v}': {e}"),
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    if values.is_empty() {
        return Err(NetErr::Parse {
            line,
            msg: "sample has no values".into(),
        });
    }

    Ok(Sample::with_class(values, class))
}
