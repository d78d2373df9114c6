use serde::Deserialize;
use url::Url;

/// Suffix the poster CDN understands as "600px wide".
const RESIZED_POSTER_SUFFIX: &str = "._V1_UX600_.jpg";

/// A single catalog entry as delivered by the movie provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    /// Rating exactly as the provider sends it (a string, possibly empty).
    #[serde(rename = "imDbRating", default)]
    pub rating: String,
    #[serde(rename = "image")]
    pub image_url: Url,
}

impl Movie {
    /// Numeric rating; anything unparsable counts as `0.0`.
    #[must_use]
    pub fn rating_value(&self) -> f32 {
        self.rating
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    /// Poster URL rewritten to the provider's resized variant.
    ///
    /// Everything from the first `._` onward is replaced; URLs without that
    /// marker are returned unchanged.
    #[must_use]
    pub fn resized_image_url(&self) -> Url {
        let raw = self.image_url.as_str();
        let Some(marker) = raw.find("._") else {
            return self.image_url.clone();
        };
        let resized = format!("{}{RESIZED_POSTER_SUFFIX}", &raw[..marker]);
        Url::parse(&resized).unwrap_or_else(|_| self.image_url.clone())
    }
}

/// The provider payload: movies plus an application-level error string.
///
/// Replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,
    #[serde(default)]
    pub items: Vec<Movie>,
}

impl Catalog {
    /// The provider's error message, if it reported one.
    #[must_use]
    pub fn provider_error(&self) -> Option<&str> {
        let message = self.error_message.trim();
        if message.is_empty() { None } else { Some(message) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"
    {
        "errorMessage": "",
        "items": [
            {
                "crew": "Dan Trachtenberg (dir.), Amber Midthunder, Dakota Beavers",
                "fullTitle": "Prey (2022)",
                "id": "tt11866324",
                "imDbRating": "7.2",
                "imDbRatingCount": "93332",
                "image": "https://m.media-amazon.com/images/M/MV5BMDBlMDYxMDkt._V1_Ratio0.6716_AL_.jpg",
                "rank": "1",
                "title": "Prey",
                "year": "2022"
            },
            {
                "fullTitle": "The Gray Man (2022)",
                "id": "tt1649418",
                "imDbRating": "6.5",
                "image": "https://m.media-amazon.com/images/M/MV5BOWY4MmFiY2Qt@._V1_Ratio0.6716_AL_.jpg",
                "title": "The Gray Man"
            }
        ]
    }
    "#;

    fn movie_with_rating(rating: &str) -> Movie {
        Movie {
            id: "tt0000001".into(),
            title: "Test".into(),
            rating: rating.into(),
            image_url: Url::parse("https://example.com/poster.jpg").unwrap(),
        }
    }

    #[test]
    fn decodes_provider_payload_and_ignores_unknown_fields() {
        let catalog: Catalog = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.provider_error(), None);
        assert_eq!(catalog.items[0].id, "tt11866324");
        assert_eq!(catalog.items[0].title, "Prey");
        assert_eq!(catalog.items[1].rating, "6.5");
    }

    #[test]
    fn missing_keys_decode_as_empty() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.provider_error(), None);
    }

    #[test]
    fn provider_error_is_reported_with_items() {
        let catalog: Catalog =
            serde_json::from_str(r#"{"errorMessage": "  Invalid API Key  ", "items": []}"#)
                .unwrap();
        assert_eq!(catalog.provider_error(), Some("Invalid API Key"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn rating_parses_with_whitespace_and_falls_back_to_zero() {
        assert!((movie_with_rating(" 8.1 ").rating_value() - 8.1).abs() < f32::EPSILON);
        assert_eq!(movie_with_rating("").rating_value(), 0.0);
        assert_eq!(movie_with_rating("n/a").rating_value(), 0.0);
        assert_eq!(movie_with_rating("NaN").rating_value(), 0.0);
    }

    #[test]
    fn resized_url_replaces_everything_after_marker() {
        let catalog: Catalog = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(
            catalog.items[0].resized_image_url().as_str(),
            "https://m.media-amazon.com/images/M/MV5BMDBlMDYxMDkt._V1_UX600_.jpg"
        );
    }

    #[test]
    fn resized_url_without_marker_is_unchanged() {
        let movie = movie_with_rating("7.0");
        assert_eq!(movie.resized_image_url(), movie.image_url);
    }
}
