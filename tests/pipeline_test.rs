mod common;

use common::FakeOreFactory;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use cipherdex::analysis::MatchOptions;
use cipherdex::parallel::{AnalysisRunner, AsyncQueue, JobOutcome};
use cipherdex::schema::{CollectionSchema, FieldType};
use cipherdex::{Collection, Config, ErrorKind, Record, RecordId};

fn schema() -> CollectionSchema {
    CollectionSchema::define("people")
        .exact("email", "email", FieldType::String)
        .range("age", "age", FieldType::Number)
        .match_fields("name", &["name"], MatchOptions::standard_downcase())
        .build()
        .unwrap()
}

/// Every `fail_every`th record carries an age that cannot be range-encoded.
fn people(count: usize, fail_every: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let record = Record::new(RecordId::generate())
                .with_field("email", format!("person{}@example.com", i))
                .with_field("name", format!("Person Number {}", i));
            if fail_every > 0 && i % fail_every == fail_every - 1 {
                record.with_field("age", "unknown")
            } else {
                record.with_field("age", i as f64)
            }
        })
        .collect()
}

#[tokio::test]
async fn test_every_job_reports_exactly_once() {
    for (count, workers, fail_every) in [(0, 1, 0), (1, 4, 0), (7, 3, 2), (50, 4, 7), (33, 1, 3), (5, 8, 1)] {
        let factory = FakeOreFactory::shared();
        let runner = AnalysisRunner::new(Config::default().with_workers(workers), factory.clone()).unwrap();
        let records = people(count, fail_every);
        let expected: BTreeSet<RecordId> = records.iter().map(|r| r.id).collect();

        let stream = runner.analyze(Arc::new(schema()), records).unwrap();
        let mut seen = BTreeSet::new();
        let mut failed = 0;
        while let Some(outcome) = stream.next().await {
            let record_id = match outcome {
                JobOutcome::Analyzed(result) => result.record_id,
                JobOutcome::Failed(failure) => {
                    assert!(failure.error.is(ErrorKind::Encoding));
                    assert!(failure.worker_id < workers);
                    failed += 1;
                    failure.record_id
                }
            };
            assert!(seen.insert(record_id), "record {} reported twice", record_id);
        }

        let expected_failures = if fail_every == 0 { 0 } else { count / fail_every };
        assert_eq!(seen, expected);
        assert_eq!(failed, expected_failures);

        let report = stream.report().unwrap();
        assert!(report.is_complete());
        assert_eq!(report.job_count, count as u64);
        assert_eq!(report.failure_count, expected_failures as u64);
        assert_eq!(report.workers_terminated, workers);
        assert!(factory.init_count() <= workers * 3);
    }
}

#[tokio::test]
async fn test_bulk_output_matches_single_put() {
    let collection = Collection::new(schema(), FakeOreFactory::shared(), Config::default().with_workers(3)).unwrap();
    let records = people(12, 0);
    let singles: Vec<_> = records.iter().map(|r| collection.prepare_put(r).unwrap()).collect();

    let (results, report) = collection.analyze_many(records).unwrap().collect().await.unwrap();
    assert_eq!(report.success_count, 12);
    assert_eq!(results.len(), 12);

    for result in results {
        let single = singles.iter().find(|p| p.record_id == result.record_id).unwrap();
        assert_eq!(single.vectors, result.vectors);
    }
}

#[tokio::test]
async fn test_queue_drains_across_threads() {
    let queue = Arc::new(AsyncQueue::new());
    let drained = Arc::new(AtomicUsize::new(0));
    let counter = drained.clone();
    queue.on_drained(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let producer = {
        let queue = queue.clone();
        std::thread::spawn(move || {
            for i in 0..100u32 {
                queue.push(i).unwrap();
            }
            queue.end();
            queue.end();
        })
    };

    let mut received = Vec::new();
    while let Some(item) = queue.next().await {
        received.push(item);
    }
    producer.join().unwrap();

    assert_eq!(received, (0..100).collect::<Vec<_>>());
    assert!(queue.is_drained());
    assert!(queue.next().await.is_none());
    assert_eq!(drained.load(Ordering::SeqCst), 1);
    assert!(queue.push(100).unwrap_err().is(ErrorKind::InvalidState));
}
