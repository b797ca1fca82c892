use std::path::Path;

use itertools::iproduct;
use xsqtools::pipeline::{
    convert_single_pass, CancelToken, Compression, ConvertOptions, NoProgress, ParallelConverter,
    RegionTask,
};
use xsqtools::xsq::MemoryXsq;
use xsqtools::{EntityKind, XsqError};

mod common;
use common::{dir_entries, read_fastq, sample_source, FailingOpener, SAMPLE};

fn single_pass(source: &MemoryXsq, opts: &ConvertOptions) -> Vec<u8> {
    let mut out = Vec::new();
    convert_single_pass(source, SAMPLE, opts, &mut out, &CancelToken::new(), &NoProgress).unwrap();
    out
}

fn parallel_to(source: &MemoryXsq, opts: &ConvertOptions, dest: &Path) -> xsqtools::Result<()> {
    ParallelConverter::new(source, opts)
        .convert_sample(SAMPLE, dest)
        .map(|_| ())
}

#[test]
fn parallel_output_matches_single_pass() {
    let compressions = [Compression::Gzip, Compression::Uncompressed];
    for (compression, workers, num_tags, colorspace) in
        iproduct!(compressions, [1, 2, 4, 16], [1, 2], [false, true])
    {
        let source = sample_source()
            .num_tags(num_tags)
            .num_regions(7)
            .colorspace(colorspace)
            .call();
        let opts = ConvertOptions {
            compression,
            workers,
            ..Default::default()
        };
        let expected = single_pass(&source, &opts);

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(format!("out{}", compression.extension()));
        parallel_to(&source, &opts, &dest).unwrap();

        let observed = read_fastq(&dest, compression == Compression::Gzip);
        assert_eq!(
            observed, expected,
            "{compression:?} with {workers} workers, {num_tags} tags"
        );
        assert_eq!(dir_entries(dir.path()), [dest]);
    }
}

#[test]
fn records_interleave_tags_per_read() {
    let source = sample_source().num_tags(3).num_regions(2).call();
    let opts = ConvertOptions {
        tags: vec!["BC".into(), "F3".into()],
        compression: Compression::Uncompressed,
        ..Default::default()
    };
    let text = String::from_utf8(single_pass(&source, &opts)).unwrap();
    let names: Vec<&str> = text.lines().step_by(4).collect();

    // 2 regions x 4 reads x 2 tags
    assert_eq!(names.len(), 16);
    for block in names.chunks(2) {
        let prefix = block[0].strip_suffix(" BC").unwrap();
        assert_eq!(block[1], format!("{prefix} F3"));
    }
    assert_eq!(names[0], "@1_0_0 BC");
    assert_eq!(names[15], "@2_1_9 F3");
}

#[test]
fn single_tag_names_have_no_tag_suffix() {
    let source = sample_source().num_regions(1).call();
    let opts = ConvertOptions {
        suffix: Some("/1".into()),
        compression: Compression::Uncompressed,
        ..Default::default()
    };
    let text = String::from_utf8(single_pass(&source, &opts)).unwrap();
    let names: Vec<&str> = text.lines().step_by(4).collect();
    assert_eq!(names, ["@1_0_0/1", "@1_0_3/1", "@1_0_6/1", "@1_0_9/1"]);
}

#[test]
fn colorspace_sequences_start_with_the_primer() {
    let source = sample_source().num_regions(1).read_len(5).colorspace(true).call();
    let opts = ConvertOptions {
        compression: Compression::Uncompressed,
        ..Default::default()
    };
    let text = String::from_utf8(single_pass(&source, &opts)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[1].starts_with('T'));
    assert_eq!(lines[1].len(), 6);
    assert_eq!(lines[3].len(), 5);
    assert!(lines[1][1..].bytes().all(|c| b"0123.".contains(&c)));
}

#[test]
fn cancelled_conversion_leaves_no_destination() {
    let source = sample_source().num_regions(10).reads_per_region(64).call();
    let opts = ConvertOptions {
        workers: 3,
        ..Default::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("S1.fastq.gz");

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let observer = move |_done: usize, _total: usize| trigger.cancel();

    let err = ParallelConverter::new(&source, &opts)
        .with_cancel(cancel)
        .with_observer(&observer)
        .convert_sample(SAMPLE, &dest)
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!dest.exists());
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn failing_region_aborts_the_sample() {
    let opener = FailingOpener {
        inner: sample_source().num_regions(6).call(),
        region: "0004".into(),
    };
    let opts = ConvertOptions {
        workers: 2,
        ..Default::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("S1.fastq.gz");

    let err = ParallelConverter::new(&opener, &opts)
        .convert_sample(SAMPLE, &dest)
        .unwrap_err();
    match err {
        XsqError::RegionFailed {
            sample,
            region,
            source,
        } => {
            assert_eq!(sample, SAMPLE);
            assert_eq!(region, "0004");
            assert!(matches!(*source, XsqError::Io(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dest.exists());
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn failing_region_keeps_previous_output() {
    let opener = FailingOpener {
        inner: sample_source().call(),
        region: "0001".into(),
    };
    let opts = ConvertOptions::default();
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("S1.fastq.gz");
    std::fs::write(&dest, b"previous").unwrap();

    assert!(ParallelConverter::new(&opener, &opts)
        .convert_sample(SAMPLE, &dest)
        .is_err());
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
}

#[test]
fn missing_sample_is_reported() {
    let source = sample_source().call();
    let opts = ConvertOptions::default();
    let dir = tempfile::tempdir().unwrap();
    let err = ParallelConverter::new(&source, &opts)
        .convert_sample("S9", &dir.path().join("S9.fastq.gz"))
        .unwrap_err();
    assert!(matches!(
        err,
        XsqError::NotFound {
            kind: EntityKind::Sample,
            ..
        }
    ));
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn parts_go_to_the_temp_dir() {
    let source = sample_source().call();
    let opts = ConvertOptions::default();
    let out = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let dest = out.path().join("S1.fastq.gz");

    let report = ParallelConverter::new(&source, &opts)
        .with_temp_dir(scratch.path())
        .convert_sample(SAMPLE, &dest)
        .unwrap();
    assert_eq!(report.regions, 3);
    assert_eq!(report.reads, 12);
    assert_eq!(report.records, 12);
    assert!(dest.exists());
    assert!(dir_entries(scratch.path()).is_empty());
}

#[test]
fn failed_merge_removes_region_parts() {
    let source = sample_source().num_regions(4).call();
    let opts = ConvertOptions {
        workers: 2,
        ..Default::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("S1.fastq.gz");
    std::fs::create_dir(&dest).unwrap();
    std::fs::write(dest.join("occupied"), b"x").unwrap();

    assert!(ParallelConverter::new(&source, &opts)
        .convert_sample(SAMPLE, &dest)
        .is_err());
    assert_eq!(dir_entries(dir.path()), [dest.clone()]);
    assert!(dest.join("occupied").exists());
}

#[test]
fn tasks_may_carry_any_index() {
    let source = sample_source().num_regions(2).call();
    let opts = ConvertOptions::default();
    let dir = tempfile::tempdir().unwrap();
    let tasks: Vec<RegionTask> = RegionTask::for_regions(
        "run",
        SAMPLE,
        &["0002".to_string(), "0001".to_string()],
        dir.path(),
        Compression::Gzip,
    )
    .into_iter()
    .map(|task| RegionTask {
        index: task.index + 40,
        ..task
    })
    .collect();

    let reports = ParallelConverter::new(&source, &opts)
        .run_tasks(&tasks)
        .unwrap();
    let indices: Vec<usize> = reports.iter().map(|r| r.index).collect();
    assert_eq!(indices, [40, 41]);
    assert!(tasks.iter().all(|t| t.part.exists()));
}
