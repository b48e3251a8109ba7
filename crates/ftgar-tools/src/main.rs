mod logger;

use clap::{arg, value_parser, Arg, ArgGroup, ArgMatches, Command};
use colorize::AnsiColor;
use ftgar::{
    archive::FtgCodec,
    create, extract,
    orchestrator::{validate_archive, validate_roots},
    ArchiveEntry, DirectoryFileEntry, Failure, Outcome, Progress,
};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::{
    cell::Cell,
    io::stdout,
    path::{Path, PathBuf},
    process::ExitCode,
};

fn cli() -> Command {
    Command::new("ftgar-tools")
        .about("Pack folders into FTG archives and unpack them again")
        .arg(
            Arg::new("create")
                .short('c')
                .long("create")
                .value_name("FOLDER")
                .help("Pack one or more folders into a single archive")
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("extract")
                .short('e')
                .long("extract")
                .value_name("ARCHIVE")
                .help("Unpack each archive into a folder beside it")
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .value_name("ARCHIVE")
                .help("List the entries of each archive")
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .group(
            ArgGroup::new("operation")
                .args(["create", "extract", "list"])
                .required(true),
        )
        .arg(arg!(-j --json "List as JSON instead of YAML"))
        .arg(arg!(-p --pretty "Pretty-print JSON listings"))
        .arg(arg!(-v --verbose ... "Log more, repeat for debug output"))
        .arg(arg!(-q --quiet "Hide progress output"))
}

pub fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        let _ = cli().print_help();
        println!();
        return ExitCode::SUCCESS;
    }
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let multi_progress = if matches.get_flag("quiet") {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    } else {
        MultiProgress::new()
    };
    if let Err(err) = logger::init(multi_progress.clone(), matches.get_count("verbose")) {
        eprintln!("Couldn't set up logging: {err}");
    }

    let succeeded = if let Some(folders) = matches.get_many::<PathBuf>("create") {
        create_archive(&folders.cloned().collect::<Vec<_>>(), &multi_progress)
    } else if let Some(archives) = matches.get_many::<PathBuf>("extract") {
        run_each(archives, |archive| extract_archive(archive, &multi_progress))
    } else if let Some(archives) = matches.get_many::<PathBuf>("list") {
        run_each(archives, |archive| list_archive(archive, &matches))
    } else {
        unreachable!()
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Runs `op` on every item, even after one fails, and reports whether all
/// of them succeeded.
fn run_each<T>(items: impl IntoIterator<Item = T>, mut op: impl FnMut(T) -> bool) -> bool {
    items.into_iter().fold(true, |ok, item| op(item) && ok)
}

fn create_archive(folders: &[PathBuf], multi_progress: &MultiProgress) -> bool {
    if let Err(err) = validate_roots(folders) {
        print_error(&anyhow::Error::from(err));
        return false;
    }
    let progress = BarProgress::new(multi_progress, "packing");
    let result = create(&FtgCodec, folders, &progress);
    progress.finish();
    report(result)
}

fn extract_archive(archive: &Path, multi_progress: &MultiProgress) -> bool {
    if let Err(err) = validate_archive(archive) {
        print_error(&anyhow::Error::from(err));
        return false;
    }
    let progress = BarProgress::new(multi_progress, "extracting");
    let result = extract(&FtgCodec, archive, &progress);
    progress.finish();
    report(result)
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    archive: String,
    entries: usize,
    len: u64,
    file_entries: &'a [DirectoryFileEntry],
}

fn list_archive(archive: &Path, matches: &ArgMatches) -> bool {
    let listed = validate_archive(archive)
        .map_err(anyhow::Error::from)
        .and_then(|()| FtgCodec.index(archive))
        .and_then(|directory| {
            let listing = Listing {
                archive: archive.display().to_string(),
                entries: directory.file_entries.len(),
                len: directory.total_len(),
                file_entries: &directory.file_entries,
            };
            if matches.get_flag("json") {
                if matches.get_flag("pretty") {
                    serde_json::to_writer_pretty(stdout().lock(), &listing)?;
                } else {
                    serde_json::to_writer(stdout().lock(), &listing)?;
                }
                println!();
            } else {
                serde_yaml::to_writer(stdout().lock(), &listing)?;
            }
            Ok(())
        });
    match listed {
        Ok(()) => true,
        Err(err) => {
            print_error(&err);
            false
        }
    }
}

fn report(result: anyhow::Result<Outcome>) -> bool {
    match result {
        Ok(outcome) if outcome.succeeded() => {
            println!("{}", outcome.summary().to_string().green());
            true
        }
        Ok(outcome) => {
            eprintln!("{} {outcome}", "failed:".red().bold());
            false
        }
        Err(err) => {
            print_error(&err);
            false
        }
    }
}

fn print_error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".red().bold());
}

struct BarProgress {
    bar: ProgressBar,
    failed: Cell<usize>,
}

impl BarProgress {
    fn new(multi_progress: &MultiProgress, verb: &str) -> Self {
        let bar = multi_progress.add(ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {prefix} {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        ));
        bar.set_prefix(verb.to_string());
        Self {
            bar,
            failed: Cell::new(0),
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for BarProgress {
    fn walking(&self, root: &Path) {
        self.bar.set_message(root.display().to_string());
    }
    fn packed(&self, entry: &ArchiveEntry) {
        self.bar.inc(1);
        self.bar.println(&entry.relative_path);
    }
    fn extracted(&self, path: &Path, _len: u64) {
        self.bar.inc(1);
        self.bar.println(path.to_string_lossy());
    }
    fn failed(&self, _failure: &Failure) {
        self.failed.set(self.failed.get() + 1);
        self.bar
            .set_message(format!("{} failed", self.failed.get()).red());
    }
}
