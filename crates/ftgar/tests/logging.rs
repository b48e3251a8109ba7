use std::{fs, sync::Mutex};

use ftgar::{create, extract, ArchiveEntry, Codec, FtgCodec};
use log::{Level, LevelFilter, Log, Metadata, Record};

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }
    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }
    fn flush(&self) {}
}

static LOGGER: Capture = Capture;

fn warnings() -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level <= Level::Warn)
        .map(|(_, message)| message.clone())
        .collect()
}

// Per-item failures belong to the outcome, which caps what it shows; only
// whole-operation problems are logged as warnings.
#[test]
fn item_failures_are_not_logged_as_warnings() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("evil.ftg");
    let mut entries: Vec<ArchiveEntry> = (0..8)
        .map(|i| ArchiveEntry::new(format!("\\..\\e{i}"), b"no".to_vec()))
        .collect();
    entries.push(ArchiveEntry::new("\\ok.txt", b"ok".to_vec()));
    FtgCodec.encode(&archive, &entries).unwrap();

    let outcome = extract(&FtgCodec, &archive, &()).unwrap();
    assert_eq!(outcome.failures().len(), 8);
    assert!(outcome.to_string().ends_with("+3 more"));
    assert!(warnings().is_empty(), "{:?}", warnings());
    assert!(RECORDS
        .lock()
        .unwrap()
        .iter()
        .any(|(level, message)| *level == Level::Debug && message.contains("\\..\\e7")));

    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    let outcome = create(&FtgCodec, &[empty], &()).unwrap();
    assert!(!outcome.succeeded());
    assert_eq!(warnings().len(), 1);
}
