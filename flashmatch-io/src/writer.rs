//! File writers for reconstruction output.

use crate::Result;
use flashmatch_core::{FlashT0, OpticalHit, TaggedTrack};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output encoding, chosen from the file extension by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    /// JSON for `.json` paths, CSV otherwise.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Writer for reconstruction results.
pub struct DataFileWriter {
    writer: BufWriter<File>,
}

impl DataFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes optical hits as CSV.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_hits_csv(&mut self, hits: &[OpticalHit]) -> Result<()> {
        writeln!(
            self.writer,
            "channel,peak_time,peak_time_abs,frame,width,area,amplitude,pe"
        )?;
        for h in hits {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{}",
                h.channel,
                h.peak_time,
                h.peak_time_abs,
                h.frame,
                h.width,
                h.area,
                h.amplitude,
                h.pe
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes cosmic tags as CSV.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_tags_csv(&mut self, tags: &[TaggedTrack]) -> Result<()> {
        writeln!(
            self.writer,
            "track,begin_x,begin_y,begin_z,end_x,end_y,end_z,score,type"
        )?;
        for t in tags {
            let (b, e) = (t.tag.begin_point, t.tag.end_point);
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{}",
                t.track_index, b.x, b.y, b.z, e.x, e.y, e.z, t.tag.score, t.tag.type_id
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes flash-matched T0s as CSV.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_t0s_csv(&mut self, t0s: &[FlashT0]) -> Result<()> {
        writeln!(self.writer, "track,time,trigger_type,flash,fit_param")?;
        for t in t0s {
            writeln!(
                self.writer,
                "{},{},{},{},{}",
                t.track_index, t.time, t.trigger_type, t.flash_index, t.fit_param
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes any serializable value as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, value)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashmatch_core::{CosmicTag, Point3, BEAM_FLASH_TAG_TYPE};
    use tempfile::NamedTempFile;

    fn hit() -> OpticalHit {
        OpticalHit {
            channel: 4,
            peak_time: 1.5,
            peak_time_abs: 101.5,
            frame: 2,
            width: 0.25,
            area: 120.0,
            amplitude: 30.0,
            pe: 6.0,
        }
    }

    #[test]
    fn test_write_hits_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        writer.write_hits_csv(&[hit()]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("channel,peak_time,peak_time_abs,frame,width,area,amplitude,pe")
        );
        assert_eq!(lines.next(), Some("4,1.5,101.5,2,0.25,120,30,6"));
    }

    #[test]
    fn test_write_tags_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        let tags = vec![TaggedTrack {
            track_index: 3,
            tag: CosmicTag {
                begin_point: Point3::new(1.0, 2.0, 3.0),
                end_point: Point3::new(4.0, 5.0, 6.0),
                score: 1.0,
                type_id: BEAM_FLASH_TAG_TYPE,
            },
        }];
        writer.write_tags_csv(&tags).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("3,1,2,3,4,5,6,1,10"));
    }

    #[test]
    fn test_write_t0s_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        let t0s = vec![FlashT0 {
            track_index: 0,
            time: 12.5,
            trigger_type: 1,
            flash_index: 2,
            fit_param: 0.5,
        }];
        writer.write_t0s_csv(&t0s).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.ends_with("0,12.5,1,2,0.5\n"));
    }

    #[test]
    fn test_write_json() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        writer.write_json(&[hit()]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let parsed: Vec<OpticalHit> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![hit()]);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
    }
}
