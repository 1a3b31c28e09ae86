// src/scrape.rs
use std::{
    collections::BTreeMap, thread, time::Duration,
    sync::{ mpsc, Arc, atomic::{ AtomicUsize, Ordering }}
};

use crate::{
    config::consts::{ JITTER_MS, REQUEST_PAUSE_MS },
    config::layout::FacultyLayout,
    fetch::PageFetcher,
    progress::Progress,
};

/// Group id → page text, `None` where the fetch failed.
pub type Documents = BTreeMap<String, Option<String>>;

/// Spread workers out a little; stable per group.
fn jitter(group: &str) -> u64 {
    group.bytes().map(u64::from).sum::<u64>() % JITTER_MS.max(1)
}

/// Fetch every group's page with a bounded worker pool. Never fails as a
/// whole: a group that cannot be fetched maps to `None`.
pub fn collect_documents(
    fetcher: Arc<dyn PageFetcher>,
    layout: &FacultyLayout,
    groups: &[String],
    workers: usize,
    mut progress: Option<&mut dyn Progress>,
) -> Documents {
    if let Some(p) = progress.as_deref_mut() {
        p.begin(groups.len());
        p.log(&format!("Fetching {} schedule pages ({})…", groups.len(), layout.id));
    }

    let jobs: Arc<Vec<(String, String)>> = Arc::new(
        groups.iter().map(|g| (g.clone(), layout.url_for(g))).collect()
    );
    let counter = Arc::new(AtomicUsize::new(0));
    let (res_tx, res_rx) = mpsc::channel::<(String, Option<String>)>();

    let workers = workers.min(jobs.len()).max(1);

    for _ in 0..workers {
        let jobs = Arc::clone(&jobs);
        let idx = Arc::clone(&counter);
        let fetcher = Arc::clone(&fetcher);
        let tx = res_tx.clone();

        thread::spawn(
            move || {
                loop {
                    let i = idx.fetch_add(1, Ordering::Relaxed);
                    if i >= jobs.len() {
                        break;
                    }
                    let (group, url) = &jobs[i];
                    let page = fetcher.fetch(group, url);
                    if tx.send((group.clone(), page)).is_err() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS + jitter(group)));
                }
            }
        );
    }
    drop(res_tx); // main thread is sole receiver now

    let mut docs: Documents = groups.iter().map(|g| (g.clone(), None)).collect();

    for _ in 0..jobs.len() {
        match res_rx.recv() {
            Ok((group, page)) => {
                if let Some(p) = progress.as_deref_mut() {
                    match &page {
                        Some(_) => p.item_done(&group),
                        None => p.item_failed(&group, "no page"),
                    }
                }
                docs.insert(group, page);
            }
            Err(_) => {
                loge!("fetch workers ended early");
                break;
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    docs
}
