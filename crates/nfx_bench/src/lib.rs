//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use nfx_format::{ExtensionCatalog, Record, RecordBuilder, MAX_ELEMENTS};
use rand::seq::SliceRandom;
use rand::Rng;

/// Generate a random payload of the specified size.
pub fn random_payload<R: Rng>(rng: &mut R, size: usize) -> Vec<u8> {
    (0..size).map(|_| rng.gen()).collect()
}

/// Build a record holding `count` distinct standard extensions in random
/// order, with random payloads.
pub fn random_record<R: Rng>(rng: &mut R, count: usize) -> Record {
    let catalog = ExtensionCatalog::standard();
    let mut ids: Vec<u16> = (1..MAX_ELEMENTS as u16).collect();
    ids.shuffle(rng);
    ids.truncate(count);

    let mut builder = RecordBuilder::new();
    for id in ids {
        let size = catalog.get(id).and_then(|def| def.fixed_size()).unwrap_or(0);
        let payload = random_payload(rng, size);
        builder = builder.add_extension(id, &payload).expect("standard extension");
    }
    builder.finish().expect("record fits")
}

/// Generate a batch of random records with `count` extensions each.
pub fn generate_records(records: usize, count: usize) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..records).map(|_| random_record(&mut rng, count)).collect()
}
