use regex::Regex;

const TAG_PATTERN: &str = r"<[^>]*>";

/// Strips markup tags and surrounding whitespace from raw field content.
///
/// Entities such as `&nbsp;` are left as-is. An empty result means the field has no usable
/// search term.
pub fn extract_keyword(raw: &str) -> String {
	let stripped = match Regex::new(TAG_PATTERN) {
		Ok(re) => re.replace_all(raw, "").into_owned(),
		Err(_) => raw.to_string(),
	};

	stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_nested_markup() {
		assert_eq!(extract_keyword("<div><b>le</b> <i>chien</i></div>"), "le chien");
	}

	#[test]
	fn keeps_entities() {
		assert_eq!(extract_keyword("chat&nbsp;noir"), "chat&nbsp;noir");
	}
}
