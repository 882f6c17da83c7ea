use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::discovery::Measurement;

/// Writes the per-pair throughput report: a snapshot timestamp, the column
/// header, then one CSV row per measured ordered pair. Pairs that produced
/// no average are absent rather than zero-filled.
pub fn write_report<W: Write>(
    writer: &mut W,
    measurements: &[Measurement],
    taken_at: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(writer, "# throughput snapshot {}", taken_at.to_rfc3339())?;
    writeln!(writer, "source, destination, average bandwidth")?;
    for measurement in measurements {
        writeln!(
            writer,
            "{},{},{:12.3}",
            measurement.source, measurement.destination, measurement.average
        )?;
    }
    Ok(())
}

/// Prints the report for the current snapshot to stdout.
pub fn print_report(measurements: &[Measurement]) -> io::Result<()> {
    write_report(&mut io::stdout().lock(), measurements, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rows_are_csv_with_fixed_width_averages() {
        let measurements = vec![
            Measurement {
                source: "ps-a.example.org".into(),
                destination: "ps-b.example.org".into(),
                average: 1234567.891,
            },
            Measurement {
                source: "ps-b.example.org".into(),
                destination: "ps-a.example.org".into(),
                average: 15.0,
            },
        ];
        let taken_at = Utc.with_ymd_and_hms(2018, 5, 4, 12, 0, 0).unwrap();

        let mut out = Vec::new();
        write_report(&mut out, &measurements, taken_at).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# throughput snapshot 2018-05-04T12:00:00+00:00");
        assert_eq!(lines[1], "source, destination, average bandwidth");
        assert_eq!(lines[2], "ps-a.example.org,ps-b.example.org, 1234567.891");
        assert_eq!(lines[3], "ps-b.example.org,ps-a.example.org,      15.000");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_no_measurements_still_writes_the_header() {
        let taken_at = Utc.with_ymd_and_hms(2018, 5, 4, 12, 0, 0).unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &[], taken_at).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with("source, destination, average bandwidth\n"));
        assert_eq!(text.lines().count(), 2);
    }
}
