//! Output formats for the cross-size summary.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::{
    error::KmerStatError,
    run::{PipelineReport, SizeOutcome},
};

/// How the final summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Aligned, human-readable table.
    #[default]
    Table,
    /// Tab-separated `kmer_size\tnumber_of_kmers` rows with a header.
    Tsv,
    /// The complete run report as JSON.
    Json,
}

impl ReportFormat {
    /// Whether the report is meant for another program rather than a person.
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Tsv | Self::Json)
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Tsv => write!(f, "tsv"),
            Self::Json => write!(f, "json"),
        }
    }
}

fn outcome_label(outcome: &SizeOutcome) -> String {
    match outcome {
        SizeOutcome::Written { distinct } => format!("{distinct} distinct"),
        SizeOutcome::Empty => "no k-mers".to_string(),
        SizeOutcome::ToolFailed { .. } => "tool failed".to_string(),
    }
}

fn write_table<W: Write>(report: &PipelineReport, mut out: W) -> io::Result<()> {
    writeln!(out, "genome length: {}", report.genome_length)?;
    writeln!(out, "{:>9}  {:>15}  {}", "kmer_size", "number_of_kmers", "result")?;
    for size in &report.sizes {
        writeln!(
            out,
            "{:>9}  {:>15}  {}",
            size.row.kmer_size,
            size.row.number_of_kmers,
            outcome_label(&size.outcome)
        )?;
    }
    for size in &report.sizes {
        if let Some(describe) = &size.describe {
            writeln!(out, "\ncounts for k={}:\n{describe}", size.row.kmer_size)?;
        }
    }
    Ok(())
}

fn write_tsv<W: Write>(report: &PipelineReport, mut out: W) -> io::Result<()> {
    writeln!(out, "kmer_size\tnumber_of_kmers")?;
    for row in report.summary_rows() {
        writeln!(out, "{}\t{}", row.kmer_size, row.number_of_kmers)?;
    }
    Ok(())
}

/// Writes `report` to `out` in the given format.
pub fn write_report<W: Write>(
    report: &PipelineReport,
    format: ReportFormat,
    mut out: W,
) -> Result<(), KmerStatError> {
    let written = match format {
        ReportFormat::Table => write_table(report, &mut out),
        ReportFormat::Tsv => write_tsv(report, &mut out),
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)
        }
    };
    written
        .and_then(|()| out.flush())
        .map_err(KmerStatError::write("<stdout>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{KmerSummaryRow, SizeReport};

    fn size(kmer_size: usize, number_of_kmers: u64, outcome: SizeOutcome) -> SizeReport {
        SizeReport {
            row: KmerSummaryRow {
                kmer_size,
                number_of_kmers,
            },
            outcome,
            csv: None,
            txt: None,
            describe: None,
            histogram: None,
            malformed_headers: 0,
            orphan_lines: 0,
        }
    }

    fn report() -> PipelineReport {
        PipelineReport {
            input: "genome.fa".into(),
            normalized: "out/genome.normalized.fa".into(),
            records: 1,
            genome_length: 20,
            sizes: vec![
                size(4, 17, SizeOutcome::Written { distinct: 3 }),
                size(10, 11, SizeOutcome::Empty),
                size(
                    21,
                    0,
                    SizeOutcome::ToolFailed {
                        message: "jellyfish count exited with 1".into(),
                    },
                ),
            ],
        }
    }

    fn render(format: ReportFormat) -> String {
        let mut out = Vec::new();
        write_report(&report(), format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn table_report() {
        insta::assert_snapshot!(render(ReportFormat::Table), @r###"
        genome length: 20
        kmer_size  number_of_kmers  result
                4               17  3 distinct
               10               11  no k-mers
               21                0  tool failed
        "###);
    }

    #[test]
    fn table_report_appends_count_summaries() {
        let mut report = report();
        report.sizes[0].describe = crate::table::FrequencyTable::from_entries([
            crate::dump::DumpEntry::new("AAAA", 3),
            crate::dump::DumpEntry::new("CCCC", 5),
        ])
        .describe();

        let mut out = Vec::new();
        write_report(&report, ReportFormat::Table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("counts for k=4:"));
        assert!(text.ends_with("max                5\n"));
        assert!(!text.contains("counts for k=10"));
    }

    #[test]
    fn tsv_report() {
        insta::assert_snapshot!(render(ReportFormat::Tsv), @r###"
        kmer_size	number_of_kmers
        4	17
        10	11
        21	0
        "###);
    }

    #[test]
    fn json_report_tags_outcomes() {
        let value: serde_json::Value = serde_json::from_str(&render(ReportFormat::Json)).unwrap();
        assert_eq!(value["sizes"][0]["status"], "written");
        assert_eq!(value["sizes"][0]["distinct"], 3);
        assert_eq!(value["sizes"][1]["status"], "empty");
        assert_eq!(value["sizes"][2]["status"], "tool_failed");
        assert_eq!(value["sizes"][2]["number_of_kmers"], 0);
    }

    #[test]
    fn display() {
        assert_eq!(ReportFormat::Table.to_string(), "table");
        assert_eq!(ReportFormat::Tsv.to_string(), "tsv");
        assert_eq!(ReportFormat::Json.to_string(), "json");
    }

    #[test]
    fn machine_readable_formats() {
        assert!(!ReportFormat::Table.is_machine_readable());
        assert!(ReportFormat::Tsv.is_machine_readable());
        assert!(ReportFormat::Json.is_machine_readable());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(
            outcome_label(&SizeOutcome::Written { distinct: 12 }),
            "12 distinct"
        );
        assert_eq!(outcome_label(&SizeOutcome::Empty), "no k-mers");
        assert_eq!(
            outcome_label(&SizeOutcome::ToolFailed {
                message: "boom".into()
            }),
            "tool failed"
        );
    }
}
