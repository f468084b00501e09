//! Multi-worker projection over one compiled plan.

use std::sync::Arc;
use std::thread;

use nfx_format::{EX_CNT_FLOW, EX_FLOW_MISC, EX_IPV4_FLOW, EX_MSEC_TIME_FLOW};
use nfx_sequencer::{SequencePlan, Sequencer, SequencerStats};
use nfx_testkit::prelude::*;

const WORKERS: usize = 4;
const RECORDS_PER_WORKER: usize = 250;

fn workload() -> Vec<Vec<u8>> {
    let shapes: [&[u16]; 4] = [
        &[EX_MSEC_TIME_FLOW, EX_IPV4_FLOW, EX_FLOW_MISC, EX_CNT_FLOW],
        &[EX_CNT_FLOW, EX_IPV4_FLOW],
        &[EX_FLOW_MISC],
        &[],
    ];
    shapes
        .iter()
        .map(|ids| record_with(ids).as_bytes().to_vec())
        .collect()
}

fn expected_outputs(records: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let entries = scenarios::flow_summary_plan();
    let mut sequencer = Sequencer::compile(&entries).unwrap();
    records
        .iter()
        .map(|record| {
            let mut out = vec![0u8; scenarios::FLOW_SUMMARY_LEN];
            sequencer.run(record, &mut out, &[7]).unwrap();
            out
        })
        .collect()
}

#[test]
fn shared_plan_with_worker_caches() {
    init_test_tracing();
    let entries = scenarios::flow_summary_plan();
    let plan = SequencePlan::compile(&entries).unwrap();
    let records = workload();
    let expected = expected_outputs(&records);

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let plan = &plan;
            let records = &records;
            let expected = &expected;
            scope.spawn(move || {
                let mut cache = plan.new_cache();
                let mut out = vec![0u8; scenarios::FLOW_SUMMARY_LEN];
                for i in 0..RECORDS_PER_WORKER {
                    let index = (worker + i) % records.len();
                    let scanned = plan
                        .scan_with(&mut cache, Default::default(), &records[index])
                        .unwrap();
                    scanned.write(&mut out, &[7]).unwrap();
                    assert_eq!(out, expected[index]);
                }
            });
        }
    });
}

#[test]
fn forked_sequencers_share_stats() {
    let entries = scenarios::flow_summary_plan();
    let stats = Arc::new(SequencerStats::new());
    let root = Sequencer::compile(&entries)
        .unwrap()
        .with_stats(Arc::clone(&stats));
    let records = workload();
    let expected = expected_outputs(&records);

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let mut sequencer = root.fork();
            let records = &records;
            let expected = &expected;
            scope.spawn(move || {
                let mut out = vec![0u8; scenarios::FLOW_SUMMARY_LEN];
                for i in 0..RECORDS_PER_WORKER {
                    let index = (worker * 3 + i) % records.len();
                    sequencer.run(&records[index], &mut out, &[7]).unwrap();
                    assert_eq!(out, expected[index]);
                }
            });
        }
    });

    let snapshot = stats.snapshot();
    let total = (WORKERS * RECORDS_PER_WORKER) as u64;
    assert_eq!(snapshot.records_scanned, total);
    assert_eq!(snapshot.records_projected, total);
    assert_eq!(
        snapshot.bytes_written,
        total * scenarios::FLOW_SUMMARY_LEN as u64
    );
    assert_eq!(snapshot.malformed_records, 0);
}

#[test]
fn concrete_vectors_hold_across_threads() {
    let vectors = sequencer_vectors();
    thread::scope(|scope| {
        for _ in 0..WORKERS {
            let vectors = &vectors;
            scope.spawn(move || {
                for vector in vectors {
                    match (vector.run(), &vector.expected_error) {
                        (Ok(out), None) => assert_eq!(hex_encode(&out), vector.expected_hex),
                        (Err(err), Some(kind)) => assert_eq!(error_kind(&err), kind),
                        (result, _) => panic!("{}: {:?}", vector.id, result),
                    }
                }
            });
        }
    });
}
