use serde::Serialize;

/// Where a product card should load its picture from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum ImageRef {
    /// Absolute path or full URL, used as-is.
    Direct(String),
    /// Bare file name resolved under the uploads prefix.
    Upload(String),
    /// No usable reference; render the placeholder.
    Placeholder(String),
}

impl ImageRef {
    pub fn resolve(picture_url: Option<&str>, uploads_prefix: &str, placeholder: &str) -> Self {
        match picture_url.map(str::trim) {
            None | Some("") => ImageRef::Placeholder(placeholder.to_string()),
            Some(reference) if reference.starts_with('/') || has_scheme(reference) => {
                ImageRef::Direct(reference.to_string())
            }
            Some(file_name) => ImageRef::Upload(format!(
                "{}/{}",
                uploads_prefix.trim_end_matches('/'),
                file_name
            )),
        }
    }

    pub fn src(&self) -> &str {
        match self {
            ImageRef::Direct(src) | ImageRef::Upload(src) | ImageRef::Placeholder(src) => src,
        }
    }
}

fn has_scheme(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "https://via.placeholder.com/300?text=Image+Not+Found";

    #[test]
    fn absolute_path_is_kept() {
        let image = ImageRef::resolve(Some("/uploads/abc_lamp.png"), "/uploads/", PLACEHOLDER);
        assert_eq!(image, ImageRef::Direct("/uploads/abc_lamp.png".to_string()));
    }

    #[test]
    fn full_url_is_kept() {
        let url = "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=400";
        assert_eq!(ImageRef::resolve(Some(url), "/uploads/", PLACEHOLDER).src(), url);
    }

    #[test]
    fn bare_file_name_goes_under_uploads() {
        let image = ImageRef::resolve(Some("lamp.png"), "/uploads/", PLACEHOLDER);
        assert_eq!(image, ImageRef::Upload("/uploads/lamp.png".to_string()));

        let image = ImageRef::resolve(Some("lamp.png"), "/static/img", PLACEHOLDER);
        assert_eq!(image.src(), "/static/img/lamp.png");
    }

    #[test]
    fn missing_reference_falls_back_to_placeholder() {
        assert_eq!(
            ImageRef::resolve(None, "/uploads/", PLACEHOLDER),
            ImageRef::Placeholder(PLACEHOLDER.to_string())
        );
        assert_eq!(
            ImageRef::resolve(Some("   "), "/uploads/", PLACEHOLDER).src(),
            PLACEHOLDER
        );
    }
}
