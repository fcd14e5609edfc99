#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{fs, path::PathBuf, process::Command};

use tempfile::TempDir;

fn kmerstat_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_kmerstat"))
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn cli_help_flag() {
    let output = kmerstat_cmd()
        .arg("--help")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kmerstat"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("common"));
}

#[test]
fn cli_version_flag() {
    let output = kmerstat_cmd()
        .arg("--version")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_missing_args() {
    let output = kmerstat_cmd()
        .arg("analyze")
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required") || stderr.contains("Usage"));
}

#[test]
fn cli_invalid_k() {
    let output = kmerstat_cmd()
        .args(["analyze", "tests/fixtures/simple.fa", "-k", "abc"])
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
}

#[test]
fn cli_zero_k_is_rejected() {
    let output = kmerstat_cmd()
        .args(["analyze", "tests/fixtures/simple.fa", "-k", "11,0"])
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least 1"));
}

#[test]
fn cli_accepts_k_above_32() {
    let dir = TempDir::new().unwrap();
    let output = kmerstat_cmd()
        .arg("analyze")
        .arg(fixture_path("multiline.fa"))
        .args(["-k", "5,33", "--plot", "none", "--format", "tsv", "-q"])
        .args(["--jellyfish", "/nonexistent/jellyfish"])
        .arg("-o")
        .arg(dir.path())
        .output()
        .expect("Failed to execute");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "kmer_size\tnumber_of_kmers\n5\t26\n33\t0\n"
    );
}

#[test]
fn cli_duplicate_k_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = kmerstat_cmd()
        .arg("analyze")
        .arg(fixture_path("simple.fa"))
        .args(["-k", "5,5", "-o"])
        .arg(dir.path())
        .output()
        .expect("Failed to execute");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("listed more than once"));
}

#[test]
fn cli_missing_input_file() {
    let output = kmerstat_cmd()
        .args(["analyze", "no/such/file.fa", "--plot", "none"])
        .output()
        .expect("Failed to execute");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no/such/file.fa"));
}

#[test]
fn cli_missing_jellyfish_still_reports_every_size() {
    let dir = TempDir::new().unwrap();
    let output = kmerstat_cmd()
        .arg("analyze")
        .arg(fixture_path("simple.fa"))
        .args(["-k", "4,10", "--plot", "none", "--format", "tsv", "-q"])
        .args(["--jellyfish", "/nonexistent/jellyfish"])
        .arg("-o")
        .arg(dir.path())
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "kmer_size\tnumber_of_kmers\n4\t17\n10\t11\n");
    assert!(!dir.path().join("kmer_frequencies_k4.csv").exists());
}

/// Writes a shell script that mimics `jellyfish count` and `jellyfish dump`.
#[cfg(unix)]
fn stand_in_jellyfish(dir: &std::path::Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("jellyfish");
    fs::write(
        &script,
        "#!/bin/sh\n\
         case \"$1\" in\n\
           count) : > \"$(echo \"$@\" | sed 's/.* -o \\([^ ]*\\) .*/\\1/')\" ;;\n\
           dump) printf '>3\\nAAAA\\n>5\\nCCCC\\nGGGG\\n' > \"$3\" ;;\n\
         esac\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn cli_analyze_with_stand_in_jellyfish() {
    let dir = TempDir::new().unwrap();
    let script = stand_in_jellyfish(dir.path());

    let out_dir = dir.path().join("results");
    let output = kmerstat_cmd()
        .arg("analyze")
        .arg(fixture_path("simple.fa"))
        .args(["-k", "4", "--plot", "svg", "--format", "json", "-q"])
        .arg("--jellyfish")
        .arg(&script)
        .arg("-o")
        .arg(&out_dir)
        .output()
        .expect("Failed to execute");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["genome_length"], 20);
    assert_eq!(report["sizes"][0]["kmer_size"], 4);
    assert_eq!(report["sizes"][0]["number_of_kmers"], 17);
    assert_eq!(report["sizes"][0]["status"], "written");

    assert_eq!(
        fs::read_to_string(out_dir.join("kmer_frequencies_k4.csv")).unwrap(),
        "kmer,count\nAAAA,3\nCCCC,5\nGGGG,5\n"
    );
    assert!(out_dir.join("kmer_top3_k4.svg").exists());
    assert!(out_dir.join("simple.normalized.fa").exists());
}

#[cfg(unix)]
#[test]
fn cli_json_stdout_parses_with_default_flags() {
    let dir = TempDir::new().unwrap();
    let script = stand_in_jellyfish(dir.path());

    let output = kmerstat_cmd()
        .arg("analyze")
        .arg(fixture_path("simple.fa"))
        .args(["-k", "4", "--format", "json"])
        .arg("--jellyfish")
        .arg(&script)
        .arg("-o")
        .arg(dir.path().join("results"))
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
    assert_eq!(report["sizes"][0]["number_of_kmers"], 17);

    // banner and bars still reach the user
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("k-mer sizes"));
    assert!(stderr.contains("Top 3 k-mers (k=4)"));
}

#[cfg(unix)]
#[test]
fn cli_table_report_keeps_banner_and_plot_on_stdout() {
    let dir = TempDir::new().unwrap();
    let script = stand_in_jellyfish(dir.path());

    let output = kmerstat_cmd()
        .arg("analyze")
        .arg(fixture_path("simple.fa"))
        .args(["-k", "4"])
        .arg("--jellyfish")
        .arg(&script)
        .arg("-o")
        .arg(dir.path().join("results"))
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("k-mer sizes"));
    assert!(stdout.contains("Top 3 k-mers (k=4)"));
    assert!(stdout.contains("genome length: 20"));
}

#[test]
fn cli_common_to_stdout() {
    let output = kmerstat_cmd()
        .arg("common")
        .arg(fixture_path("genomes"))
        .args(["-k", "3", "-q"])
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "kmer\tfrequency\nACG\t4\nCGT\t4\nGTA\t2\nTAC\t2\n"
    );
}

#[test]
fn cli_common_empty_dir_fails() {
    let dir = TempDir::new().unwrap();
    let output = kmerstat_cmd()
        .arg("common")
        .arg(dir.path())
        .output()
        .expect("Failed to execute");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no FASTA files"));
}

#[test]
fn cli_common_reads_gzipped_genomes() {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let dir = TempDir::new().unwrap();
    fs::copy(fixture_path("genomes/two.fa"), dir.path().join("two.fa")).unwrap();
    let one = fs::read(fixture_path("genomes/one.fna")).unwrap();
    let file = fs::File::create(dir.path().join("one.fna.gz")).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&one).unwrap();
    encoder.finish().unwrap();

    let output = kmerstat_cmd()
        .arg("common")
        .arg(dir.path())
        .args(["-k", "3", "-q"])
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "kmer\tfrequency\nACG\t4\nCGT\t4\nGTA\t2\nTAC\t2\n"
    );
}

/// Writes a shell script that mimics `wget -q -O out url` by copying
/// `genome`, failing for URLs under `/missing/`.
#[cfg(unix)]
fn stand_in_wget(dir: &std::path::Path, genome: &std::path::Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("wget");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\n\
             case \"$4\" in\n\
               */missing/*) : > \"$3\"; exit 8 ;;\n\
               *) cp '{}' \"$3\" ;;\n\
             esac\n",
            genome.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn cli_fetch_downloads_selected_accessions() {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let tools = TempDir::new().unwrap();
    let genome = tools.path().join("genome.fna.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&genome).unwrap(), Compression::default());
    encoder.write_all(b">chr\nACGTACGT\n").unwrap();
    encoder.finish().unwrap();
    let wget = stand_in_wget(tools.path(), &genome);

    let out = TempDir::new().unwrap();
    let output = kmerstat_cmd()
        .arg("fetch")
        .arg(fixture_path("assembly_summary.txt"))
        .args(["-a", "GCA_000006945.2,GCA_000009999.1,GCA_404.1", "-q"])
        .arg("-o")
        .arg(out.path())
        .arg("--wget")
        .arg(&wget)
        .output()
        .expect("Failed to execute");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GCA_000006945.2"));
    assert!(stdout.contains("failed"));
    assert!(!stdout.contains("GCA_000005845.2"));

    let fetched = out.path().join("GCA_000006945.2_GCA_000006945.2_ASM694v2_genomic.fna");
    assert_eq!(fs::read_to_string(fetched).unwrap(), ">chr\nACGTACGT\n");
    assert!(!out.path().join("GCA_000009999.1_GCA_000009999.1_Gone_genomic.fna").exists());

    let summary = fs::read_to_string(out.path().join("download_summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.contains(",downloaded"));
    assert!(summary.contains(",failed"));
}
