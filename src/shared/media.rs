/// Rewrites a stored asset reference to a displayable URL: absolute
/// `http(s)` values pass through unchanged, anything else is served from the
/// bundled assets root.
pub fn resolve_asset_url(value: &str) -> String {
    if value.starts_with("http") {
        value.to_string()
    } else {
        format!("/assets/{}", value)
    }
}

/// Thumbnail resolution for a project detail blob: explicit thumbnail first,
/// then the first gallery image, else none.
pub fn thumbnail_url(thumbnail: Option<&str>, images: &[String]) -> Option<String> {
    thumbnail
        .or_else(|| images.first().map(String::as_str))
        .map(resolve_asset_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_pass_through() {
        assert_eq!(
            resolve_asset_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_relative_values_move_under_assets() {
        assert_eq!(resolve_asset_url("shots/a.png"), "/assets/shots/a.png");
    }

    #[test]
    fn test_thumbnail_prefers_explicit_value() {
        let images = vec!["first.png".to_string()];

        let url = thumbnail_url(Some("thumb.png"), &images);

        assert_eq!(url.as_deref(), Some("/assets/thumb.png"));
    }

    #[test]
    fn test_thumbnail_falls_back_to_first_image() {
        let images = vec!["first.png".to_string(), "second.png".to_string()];

        let url = thumbnail_url(None, &images);

        assert_eq!(url.as_deref(), Some("/assets/first.png"));
    }

    #[test]
    fn test_no_thumbnail_without_candidates() {
        assert_eq!(thumbnail_url(None, &[]), None);
    }
}
