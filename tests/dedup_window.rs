// tests/dedup_window.rs
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rand::seq::SliceRandom;
use sec_filing_crawler::dedup::DedupRegistry;

#[test]
fn concurrent_checks_admit_an_id_exactly_once() {
    let reg = Arc::new(DedupRegistry::with_capacity(1000));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reg = reg.clone();
            thread::spawn(move || reg.is_new("accession-0000320193-24-000123"))
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join())
        .filter(|r| matches!(r, Ok(true)))
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(reg.len(), 1);
}

#[test]
fn window_keeps_the_most_recently_admitted_ids() {
    let capacity = 100;
    let reg = DedupRegistry::with_capacity(capacity);

    // Each id appears twice, in shuffled order; only the first sighting
    // of an in-window id may be admitted.
    let mut ids: Vec<String> = (0..500)
        .flat_map(|i| [format!("id-{i}"), format!("id-{i}")])
        .collect();
    ids.shuffle(&mut rand::rng());

    let mut admitted = Vec::new();
    for id in &ids {
        if reg.is_new(id) {
            admitted.push(id.clone());
        }
    }

    assert_eq!(reg.len(), capacity);
    // The last `capacity` admissions are all still inside the window.
    for id in &admitted[admitted.len() - capacity..] {
        assert!(!reg.is_new(id), "{id} should still be deduplicated");
    }
    // Any id whose last admission predates the surviving window has been
    // evicted and is admissible again. (An early admission alone is not
    // enough: the id's second sighting may have re-admitted it later.)
    let survivors: HashSet<&String> = admitted[admitted.len() - capacity..].iter().collect();
    let evicted = admitted
        .iter()
        .find(|id| !survivors.contains(id))
        .expect("more ids admitted than the window holds");
    assert!(reg.is_new(evicted));
}

#[test]
fn never_grows_past_capacity() {
    let reg = DedupRegistry::with_capacity(10);
    for i in 0..1000 {
        reg.is_new(&format!("id-{i}"));
        assert!(reg.len() <= 10);
    }
}
