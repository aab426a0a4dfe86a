use pix_config::ImagePosition;
use pix_domain::{
	Note, NoteId,
	field::{self, Eligible, Ineligible},
	keyword, media,
};

fn note(fields: &[(&str, &str)]) -> Note {
	Note::new(
		NoteId(1),
		fields.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect(),
	)
}

fn is_hex_id(text: &str) -> bool {
	text.len() == 8 && text.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

#[test]
fn plain_content_is_only_trimmed() {
	assert_eq!(keyword::extract_keyword("  Paris \n"), "Paris");
	assert_eq!(keyword::extract_keyword("Tour Eiffel"), "Tour Eiffel");
}

#[test]
fn markup_is_removed() {
	assert_eq!(keyword::extract_keyword("<b>Paris</b>"), "Paris");
}

#[test]
fn all_tag_content_yields_empty_keyword() {
	assert_eq!(keyword::extract_keyword("<br><div></div> <br/>"), "");
}

#[test]
fn field_with_image_is_ineligible() {
	let with_image = note(&[("Front", "chien <IMG src=\"dog.jpg\">")]);

	assert_eq!(
		field::check_eligibility(&with_image, "Front", "Front"),
		Err(Ineligible::HasImage)
	);
}

#[test]
fn field_with_keyword_and_no_image_is_eligible() {
	let plain = note(&[("Front", "<b>chien</b>"), ("Back", "dog")]);

	assert_eq!(
		field::check_eligibility(&plain, "Front", "Back"),
		Ok(Eligible { keyword: "chien".to_string(), target_index: 1 })
	);
}

#[test]
fn empty_keyword_and_missing_fields_are_ineligible() {
	let empty = note(&[("Front", "<br>")]);

	assert_eq!(field::check_eligibility(&empty, "Front", "Front"), Err(Ineligible::EmptyKeyword));
	assert_eq!(
		field::check_eligibility(&empty, "Source", "Front"),
		Err(Ineligible::SourceFieldMissing)
	);
	assert_eq!(
		field::check_eligibility(&note(&[("Front", "chien")]), "Front", "Image"),
		Err(Ineligible::TargetFieldMissing)
	);
}

#[test]
fn image_lands_at_configured_position() {
	assert_eq!(
		field::place_image("Paris", "x.jpg", ImagePosition::After),
		"Paris<br><img src=\"x.jpg\">"
	);
	assert_eq!(
		field::place_image("Paris", "x.jpg", ImagePosition::Before),
		"<img src=\"x.jpg\"><br>Paris"
	);
	assert_eq!(field::place_image("Paris", "x.jpg", ImagePosition::Replace), "<img src=\"x.jpg\">");
}

#[test]
fn filename_has_sanitized_keyword_and_random_id() {
	let name = media::media_filename("tour eiffel!", ".png");
	let stem = name.strip_suffix(".png").expect("Missing extension.");
	let (keyword, id) = stem.rsplit_once('_').expect("Missing id separator.");

	assert_eq!(keyword, "tour_eiffel_");
	assert!(is_hex_id(id), "Unexpected id: {id}");
}

#[test]
fn repeated_keywords_get_distinct_filenames() {
	let first = media::media_filename("chien", ".jpg");
	let second = media::media_filename("chien", ".jpg");

	assert_ne!(first, second);
}

#[test]
fn unicode_letters_survive_sanitizing() {
	assert_eq!(media::sanitize_keyword("élève/ça"), "élève_ça");
}

#[test]
fn extension_prefers_content_type() {
	assert_eq!(media::infer_extension(Some("image/png"), "https://x/a.jpg"), ".png");
	assert_eq!(media::infer_extension(Some("image/gif"), "https://x/a"), ".gif");
	assert_eq!(media::infer_extension(Some("image/jpeg; charset=binary"), "https://x/a"), ".jpg");
}

#[test]
fn extension_falls_back_to_url_then_default() {
	assert_eq!(media::infer_extension(Some("application/octet-stream"), "https://x/a.webp"), ".webp");
	assert_eq!(media::infer_extension(None, "https://x/a.gif?v=2"), ".gif");
	assert_eq!(media::infer_extension(None, "https://x/image"), media::DEFAULT_EXTENSION);
}

#[test]
fn note_field_accessors_follow_layout() {
	let mut n = note(&[("Front", "a"), ("Back", "b")]);

	assert_eq!(n.field_names().collect::<Vec<_>>(), vec!["Front", "Back"]);
	assert_eq!(n.field_value(1), Some("b"));
	assert!(n.set_field_value(0, "c".to_string()));
	assert!(!n.set_field_value(5, "d".to_string()));
	assert_eq!(n.field_value(0), Some("c"));
}
