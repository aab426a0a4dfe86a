mod support;

use std::sync::Arc;

use pix_config::Config;
use pix_domain::{NoteId, field::Ineligible};
use pix_service::{
	BatchSettings, Error, ImagePicker, ItemOutcome, SkipReason,
	picker::{self, DEFAULT_CANDIDATES},
};

use support::{FakeFetch, FakeSearch, MemoryHost};

fn new_picker(search: &Arc<FakeSearch>, fetch: &Arc<FakeFetch>) -> ImagePicker {
	ImagePicker::new(
		BatchSettings::from_config(&Config::default()),
		support::providers(search, fetch),
	)
}

#[tokio::test]
async fn lists_ranked_candidates() {
	let search = Arc::new(FakeSearch::with_hits(20));
	let fetch = Arc::new(FakeFetch::default());
	let host = MemoryHost::default().with_note(7, &[("Front", "<i>maison</i>")]);
	let candidates = new_picker(&search, &fetch)
		.candidates(&host, NoteId(7), DEFAULT_CANDIDATES)
		.await
		.expect("Candidates should load.");

	assert_eq!(candidates.len(), DEFAULT_CANDIDATES as usize);
	assert_eq!(candidates[0].url, "https://img.test/maison/0.jpg");
	assert_eq!(search.calls()[0].count, DEFAULT_CANDIDATES);
	assert!(fetch.fetched().is_empty());
}

#[tokio::test]
async fn applies_the_chosen_candidate() {
	let search = Arc::new(FakeSearch::with_hits(5));
	let fetch = Arc::new(FakeFetch::default());
	let mut host = MemoryHost::default().with_note(7, &[("Front", "maison")]);
	let image_picker = new_picker(&search, &fetch);
	let candidates =
		image_picker.candidates(&host, NoteId(7), 5).await.expect("Candidates should load.");
	let choice = picker::choose(&candidates, 3).expect("Index should exist.");
	let outcome =
		image_picker.apply(&mut host, NoteId(7), choice).await.expect("Apply should succeed.");
	let ItemOutcome::Processed { filename } = outcome else {
		panic!("Expected processed outcome, got {outcome:?}.");
	};

	assert_eq!(fetch.fetched(), vec!["https://img.test/maison/3.jpg".to_string()]);
	assert_eq!(host.media[&filename], b"https://img.test/maison/3.jpg".to_vec());
	assert_eq!(host.field(7, "Front"), format!("maison<br><img src=\"{filename}\">"));
}

#[tokio::test]
async fn ineligible_note_is_rejected_before_searching() {
	let search = Arc::new(FakeSearch::with_hits(5));
	let fetch = Arc::new(FakeFetch::default());
	let host = MemoryHost::default().with_note(7, &[("Front", "maison<img src=\"m.jpg\">")]);
	let err = new_picker(&search, &fetch)
		.candidates(&host, NoteId(7), 5)
		.await
		.expect_err("Expected ineligible note.");

	assert!(matches!(
		err,
		Error::NotEligible {
			note_id: NoteId(7),
			reason: SkipReason::Ineligible(Ineligible::HasImage)
		}
	));
	assert!(search.calls().is_empty());
}

#[tokio::test]
async fn search_errors_reach_the_caller() {
	let search = Arc::new(FakeSearch {
		hits: 5,
		failing_keywords: ["maison".to_string()].into(),
		..FakeSearch::default()
	});
	let fetch = Arc::new(FakeFetch::default());
	let host = MemoryHost::default().with_note(7, &[("Front", "maison")]);
	let err = new_picker(&search, &fetch)
		.candidates(&host, NoteId(7), 5)
		.await
		.expect_err("Expected provider error.");

	assert!(matches!(err, Error::Provider(_)));
}

#[test]
fn out_of_range_choice_reports_available_count() {
	let err = picker::choose(&[], 2).expect_err("Expected missing candidate.");

	assert!(matches!(err, Error::NoSuchCandidate { index: 2, available: 0 }));
}
