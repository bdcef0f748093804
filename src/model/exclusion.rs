use serde::Deserialize;

/// Entry of a catalog's "do not re-add" list.
///
/// Movie servers report `tmdbId`/`movieTitle`/`movieYear`, series servers
/// `tvdbId`/`title`; both land in the same fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    id: Option<i64>,
    #[serde(alias = "tmdbId", alias = "tvdbId")]
    external_id: Option<i64>,
    #[serde(alias = "movieTitle")]
    title: Option<String>,
    #[serde(alias = "movieYear")]
    year: Option<i32>,
}

impl Exclusion {
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// TMDb id for movies, TVDb id for series.
    pub fn external_id(&self) -> Option<i64> {
        self.external_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_and_series_shapes() {
        let movie: Exclusion = serde_json::from_value(json!({
            "id": 1, "tmdbId": 603, "movieTitle": "The Matrix", "movieYear": 1999
        }))
        .unwrap();
        assert_eq!(movie.external_id(), Some(603));
        assert_eq!(movie.title(), Some("The Matrix"));
        assert_eq!(movie.year(), Some(1999));

        let series: Exclusion =
            serde_json::from_value(json!({"id": 2, "tvdbId": 81189, "title": "Breaking Bad"}))
                .unwrap();
        assert_eq!(series.external_id(), Some(81189));
        assert_eq!(series.year(), None);
    }
}
