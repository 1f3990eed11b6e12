//! `atomlite` command line entry point.
//!
//! # Responsibility
//! - Export stored molecules to chemical file formats.
//! - Report failures with the full error chain and a non-zero exit code.

use anyhow::{anyhow, bail, Context, Result};
use atomlite_core::chem::molfile::{write_sdf, write_v3000};
use atomlite_core::{decode, init_logging, Database, DatabaseConfig, LoggingConfig, Mol};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "atomlite", about = "Molecule database utilities", version)]
struct Cli {
    /// Directory for log files (absolute path); logging is off when omitted
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level used with --log-dir
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a molecule from a database to a .mol or .sdf file
    Dump(DumpArgs),
}

#[derive(Args)]
struct DumpArgs {
    /// Path to the atomlite database
    database_path: PathBuf,

    /// Key of the entry to export
    entry_key: String,

    /// Output file; the extension selects the format
    dump_path: PathBuf,

    /// Table holding the entries
    #[arg(long, value_name = "NAME", default_value = atomlite_core::DEFAULT_MOLECULE_TABLE)]
    table: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Mol,
    Sdf,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("mol") => Ok(Self::Mol),
            Some("sdf") => Ok(Self::Sdf),
            Some(other) => bail!("unsupported output extension `.{other}`; expected .mol or .sdf"),
            None => bail!(
                "output path `{}` has no extension; expected .mol or .sdf",
                path.display()
            ),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let config = LoggingConfig::parse(&cli.log_level, log_dir)?;
        init_logging(&config)?;
    }
    match cli.command {
        Command::Dump(args) => dump(&args),
    }
}

fn dump(args: &DumpArgs) -> Result<()> {
    let format = OutputFormat::from_path(&args.dump_path)?;
    if !args.database_path.is_file() {
        bail!("database `{}` does not exist", args.database_path.display());
    }
    let db = Database::open(
        &args.database_path,
        &DatabaseConfig::with_table(args.table.clone()),
    )
    .with_context(|| format!("failed to open `{}`", args.database_path.display()))?;

    let entry = db
        .get_entry(&args.entry_key)?
        .ok_or_else(|| anyhow!("no entry with key `{}`", args.entry_key))?;
    let molecule = entry
        .molecule
        .ok_or_else(|| anyhow!("entry `{}` has no molecule", args.entry_key))?;
    let mol: Mol = decode(&molecule)
        .with_context(|| format!("failed to decode molecule `{}`", args.entry_key))?;

    // The output path is only touched once rendering succeeded.
    let mut rendered = Vec::new();
    match format {
        OutputFormat::Mol => write_v3000(&mut rendered, &mol, &args.entry_key)?,
        OutputFormat::Sdf => write_sdf(&mut rendered, &mol, &args.entry_key)?,
    }
    fs::write(&args.dump_path, &rendered)
        .with_context(|| format!("failed to write `{}`", args.dump_path.display()))?;

    info!(
        "event=dump module=cli status=ok key={} atoms={} output={}",
        args.entry_key,
        mol.atom_count(),
        args.dump_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/benzene.mol")).unwrap(),
            OutputFormat::Mol
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("BENZENE.SDF")).unwrap(),
            OutputFormat::Sdf
        );
        assert!(OutputFormat::from_path(Path::new("benzene.xyz")).is_err());
        assert!(OutputFormat::from_path(Path::new("benzene")).is_err());
    }

    #[test]
    fn cli_parses_dump_arguments() {
        let cli = Cli::try_parse_from(["atomlite", "dump", "db.sqlite", "mol-1", "out.mol"])
            .expect("dump arguments should parse");
        let Command::Dump(args) = cli.command;
        assert_eq!(args.entry_key, "mol-1");
        assert_eq!(args.table, "molecules");
        assert!(cli.log_dir.is_none());
    }

    #[test]
    fn dump_writes_molfile_for_stored_entry() {
        let dir = tempfile::tempdir().unwrap();
        let database_path = dir.path().join("store.db");
        let db = Database::open(&database_path, &DatabaseConfig::default()).unwrap();
        let molecule = atomlite_core::Molecule {
            atomic_numbers: vec![6, 8],
            bonds: Some(atomlite_core::Bonds {
                atom1: vec![0],
                atom2: vec![1],
                order: vec![2.0],
            }),
            ..Default::default()
        };
        db.add_entries([&atomlite_core::Entry::new("co", molecule)], true)
            .unwrap();
        drop(db);

        let args = DumpArgs {
            database_path: database_path.clone(),
            entry_key: "co".to_string(),
            dump_path: dir.path().join("co.sdf"),
            table: atomlite_core::DEFAULT_MOLECULE_TABLE.to_string(),
        };
        dump(&args).unwrap();

        let written = std::fs::read_to_string(&args.dump_path).unwrap();
        assert!(written.starts_with("co\n"));
        assert!(written.contains("M  V30 COUNTS 2 1 0 0 0"));
        assert!(written.trim_end().ends_with("$$$$"));

        let missing = DumpArgs {
            entry_key: "absent".to_string(),
            ..args
        };
        let err = dump(&missing).unwrap_err();
        assert!(err.to_string().contains("no entry with key `absent`"));
    }

    #[test]
    fn dump_leaves_no_file_for_unwritable_molecule() {
        let dir = tempfile::tempdir().unwrap();
        let database_path = dir.path().join("store.db");
        let db = Database::open(&database_path, &DatabaseConfig::default()).unwrap();
        let molecule = atomlite_core::Molecule {
            atomic_numbers: vec![6, 6],
            bonds: Some(atomlite_core::Bonds {
                atom1: vec![0],
                atom2: vec![1],
                order: vec![1.5],
            }),
            ..Default::default()
        };
        db.add_entries([&atomlite_core::Entry::new("cc", molecule)], true)
            .unwrap();
        drop(db);

        let args = DumpArgs {
            database_path,
            entry_key: "cc".to_string(),
            dump_path: dir.path().join("cc.mol"),
            table: "molecules".to_string(),
        };
        assert!(dump(&args).is_err());
        assert!(!args.dump_path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn dump_reports_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let database_path = dir.path().join("store.db");
        let db = Database::open(&database_path, &DatabaseConfig::default()).unwrap();
        let molecule = atomlite_core::Molecule {
            atomic_numbers: vec![8],
            ..Default::default()
        };
        db.add_entries([&atomlite_core::Entry::new("o", molecule)], true)
            .unwrap();
        drop(db);

        let dump_path = dir.path().join("full.mol");
        std::os::unix::fs::symlink("/dev/full", &dump_path).unwrap();
        let args = DumpArgs {
            database_path,
            entry_key: "o".to_string(),
            dump_path,
            table: "molecules".to_string(),
        };
        let err = dump(&args).unwrap_err();
        assert!(err.to_string().contains("failed to write"));
    }

    #[test]
    fn dump_refuses_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let args = DumpArgs {
            database_path: dir.path().join("nope.db"),
            entry_key: "x".to_string(),
            dump_path: dir.path().join("x.mol"),
            table: "molecules".to_string(),
        };
        assert!(dump(&args).is_err());
        assert!(!args.database_path.exists());
    }
}
