use validator::Validate;

use crate::error::ApiError;

/// Maximum number of tags on a card.
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag, in characters.
pub const MAX_TAG_LEN: usize = 50;

/// Run the derived validators and convert failures into a 400.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(ApiError::from)
}

/// Reject strings that are empty once trimmed.
pub fn validate_not_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} cannot be blank")));
    }
    Ok(())
}

/// Tags must be non-blank, at most [`MAX_TAG_LEN`] characters, and no more than [`MAX_TAGS`].
pub fn validate_tags(tags: &[String]) -> Result<(), ApiError> {
    if tags.len() > MAX_TAGS {
        return Err(ApiError::Validation(format!(
            "A card can have at most {MAX_TAGS} tags"
        )));
    }
    if tags
        .iter()
        .any(|tag| tag.trim().is_empty() || tag.chars().count() > MAX_TAG_LEN)
    {
        return Err(ApiError::Validation(format!(
            "Tags must be between 1 and {MAX_TAG_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("word", "hola").is_ok());
        assert!(validate_not_blank("word", "").is_err());
        assert!(matches!(
            validate_not_blank("word", "   "),
            Err(ApiError::Validation(msg)) if msg == "word cannot be blank"
        ));
    }

    #[test]
    fn test_validate_tags() {
        assert!(validate_tags(&[]).is_ok());
        assert!(validate_tags(&["verbs".to_string(), "a1".to_string()]).is_ok());

        assert!(validate_tags(&[" ".to_string()]).is_err());
        assert!(validate_tags(&["x".repeat(MAX_TAG_LEN + 1)]).is_err());
        assert!(validate_tags(&vec!["t".to_string(); MAX_TAGS + 1]).is_err());
    }
}
