use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ncview_core::{export, human, sort, Entry, OwnerFilter, TreeBuilder};

mod scan;

#[derive(Parser, Debug)]
#[command(
    name = "ncview",
    about = "Wrapper over the ncdu command: browse scan results grouped by file owner"
)]
struct Args {
    /// Folder to be scanned by the ncdu command
    #[arg(
        short,
        long,
        value_name = "DIR",
        conflicts_with = "load",
        required_unless_present = "load"
    )]
    scan: Option<PathBuf>,

    /// File generated previously with `ncdu -x -e -o ...`
    #[arg(short, long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Exclude files/folders matching the pattern; only meaningful with --scan
    #[arg(short = 'x', long, value_name = "PATTERN", requires = "scan", conflicts_with = "load")]
    exclude: Option<String>,

    /// Owner to group sizes by; `*` means all owners
    #[arg(short, long, default_value = "*", value_name = "NAME")]
    owner: String,

    /// Print the owners seen in the scan and exit
    #[arg(long)]
    owners: bool,

    /// Maximum tree depth to print; 0 prints the root only
    #[arg(short, long, value_name = "N")]
    depth: Option<usize>,

    /// Write a CSV report
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write a JSON report
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Increase verbosity level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // In scan mode the export lives in a temp file that must outlive the load.
    let scan_output = match &args.scan {
        Some(dir) => Some(scan::run_ncdu(dir, args.exclude.as_deref())?),
        None => None,
    };
    let export_path = match (&scan_output, &args.load) {
        (Some(tmp), _) => tmp.path().to_path_buf(),
        (None, Some(file)) => file.clone(),
        (None, None) => unreachable!("clap requires --scan or --load"),
    };

    let mut builder = TreeBuilder::new();
    let mut root = ncview_core::load_path(&export_path, &mut builder)?;
    let owners = builder.known_owners();

    if args.owners {
        for owner in &owners {
            println!("{owner}");
        }
        return Ok(());
    }

    let filter = OwnerFilter::parse(&args.owner);
    sort::sort_by_size_for_owner(&mut root, &filter);

    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path)?;
        export::to_csv(&root, file)?;
        tracing::info!("wrote CSV report to {}", path.display());
    }
    if let Some(path) = &args.json {
        let report = export::to_json(&root, &owners);
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("wrote JSON report to {}", path.display());
    }

    println!(
        "{:<52} {:>12} {:>12}",
        "Path",
        "Size(MB)",
        format!("Owned by {filter}")
    );
    print_tree(&root, &filter, 0, args.depth.unwrap_or(usize::MAX));
    println!(
        "total: {} ({} owned by {})",
        human::human_bytes(root.hierarchy_size()),
        human::human_bytes(root.hierarchy_size_for_owner(&filter)),
        filter
    );
    Ok(())
}

fn print_tree(entry: &Entry, filter: &OwnerFilter, level: usize, max_depth: usize) {
    println!(
        "{:indent$}{:<width$} {:>12} {:>12}",
        "",
        entry.name,
        human::mb_string(entry.hierarchy_size()),
        human::mb_string(entry.hierarchy_size_for_owner(filter)),
        indent = level * 2,
        width = 52_usize.saturating_sub(level * 2),
    );
    if level >= max_depth {
        return;
    }
    for child in &entry.children {
        print_tree(child, filter, level + 1, max_depth);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn argument_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn scan_and_load_are_exclusive_but_one_is_required() {
        assert!(Args::try_parse_from(["ncview"]).is_err());
        assert!(Args::try_parse_from(["ncview", "--scan", "/tmp", "--load", "x.json"]).is_err());
        assert!(Args::try_parse_from(["ncview", "--load", "x.json"]).is_ok());
        assert!(Args::try_parse_from(["ncview", "--scan", "/tmp"]).is_ok());
    }

    #[test]
    fn exclude_requires_scan_mode() {
        assert!(Args::try_parse_from(["ncview", "--load", "x.json", "-x", "*.o"]).is_err());
        assert!(Args::try_parse_from(["ncview", "--scan", "/tmp", "-x", "*.o"]).is_ok());
    }
}
