use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Genre columns exposed by the catalog backend.
///
/// Each movie carries one 0/1 field per genre; a movie may have any number
/// of them set. Variants are declared in the backend's column order, which is
/// also the `Ord` order used for genre buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Genre {
    Action,
    Adventure,
    AnimeSeriesInternationalTvShows,
    BritishTvShowsDocuseriesInternationalTvShows,
    Children,
    Comedies,
    ComediesDramasInternationalMovies,
    ComediesInternationalMovies,
    ComediesRomanticMovies,
    CrimeTvShowsDocuseries,
    Documentaries,
    DocumentariesInternationalMovies,
    Docuseries,
    Dramas,
    DramasInternationalMovies,
    DramasRomanticMovies,
    FamilyMovies,
    Fantasy,
    HorrorMovies,
    InternationalMoviesThrillers,
    InternationalTvShowsRomanticTvShowsTvDramas,
    KidsTv,
    LanguageTvShows,
    Musicals,
    NatureTv,
    RealityTv,
    Spirituality,
    TvAction,
    TvComedies,
    TvDramas,
    TalkShowsTvComedies,
    Thrillers,
}

impl Genre {
    pub const ALL: [Genre; 32] = [
        Genre::Action,
        Genre::Adventure,
        Genre::AnimeSeriesInternationalTvShows,
        Genre::BritishTvShowsDocuseriesInternationalTvShows,
        Genre::Children,
        Genre::Comedies,
        Genre::ComediesDramasInternationalMovies,
        Genre::ComediesInternationalMovies,
        Genre::ComediesRomanticMovies,
        Genre::CrimeTvShowsDocuseries,
        Genre::Documentaries,
        Genre::DocumentariesInternationalMovies,
        Genre::Docuseries,
        Genre::Dramas,
        Genre::DramasInternationalMovies,
        Genre::DramasRomanticMovies,
        Genre::FamilyMovies,
        Genre::Fantasy,
        Genre::HorrorMovies,
        Genre::InternationalMoviesThrillers,
        Genre::InternationalTvShowsRomanticTvShowsTvDramas,
        Genre::KidsTv,
        Genre::LanguageTvShows,
        Genre::Musicals,
        Genre::NatureTv,
        Genre::RealityTv,
        Genre::Spirituality,
        Genre::TvAction,
        Genre::TvComedies,
        Genre::TvDramas,
        Genre::TalkShowsTvComedies,
        Genre::Thrillers,
    ];

    /// Backend JSON field name (also used as the `movieTypes` query value)
    pub fn field_name(self) -> &'static str {
        match self {
            Genre::Action => "action",
            Genre::Adventure => "adventure",
            Genre::AnimeSeriesInternationalTvShows => "animeSeriesInternationalTvShows",
            Genre::BritishTvShowsDocuseriesInternationalTvShows => {
                "britishTvShowsDocuseriesInternationalTvShows"
            }
            Genre::Children => "children",
            Genre::Comedies => "comedies",
            Genre::ComediesDramasInternationalMovies => "comediesDramasInternationalMovies",
            Genre::ComediesInternationalMovies => "comediesInternationalMovies",
            Genre::ComediesRomanticMovies => "comediesRomanticMovies",
            Genre::CrimeTvShowsDocuseries => "crimeTvShowsDocuseries",
            Genre::Documentaries => "documentaries",
            Genre::DocumentariesInternationalMovies => "documentariesInternationalMovies",
            Genre::Docuseries => "docuseries",
            Genre::Dramas => "dramas",
            Genre::DramasInternationalMovies => "dramasInternationalMovies",
            Genre::DramasRomanticMovies => "dramasRomanticMovies",
            Genre::FamilyMovies => "familyMovies",
            Genre::Fantasy => "fantasy",
            Genre::HorrorMovies => "horrorMovies",
            Genre::InternationalMoviesThrillers => "internationalMoviesThrillers",
            Genre::InternationalTvShowsRomanticTvShowsTvDramas => {
                "internationalTvShowsRomanticTvShowsTvDramas"
            }
            Genre::KidsTv => "kidsTv",
            Genre::LanguageTvShows => "languageTvShows",
            Genre::Musicals => "musicals",
            Genre::NatureTv => "natureTv",
            Genre::RealityTv => "realityTv",
            Genre::Spirituality => "spirituality",
            Genre::TvAction => "tvAction",
            Genre::TvComedies => "tvComedies",
            Genre::TvDramas => "tvDramas",
            Genre::TalkShowsTvComedies => "talkShowsTvComedies",
            Genre::Thrillers => "thrillers",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::AnimeSeriesInternationalTvShows => "Anime Series & International TV",
            Genre::BritishTvShowsDocuseriesInternationalTvShows => "British TV & Docuseries",
            Genre::Children => "Children",
            Genre::Comedies => "Comedies",
            Genre::ComediesDramasInternationalMovies => "International Comedy Dramas",
            Genre::ComediesInternationalMovies => "International Comedies",
            Genre::ComediesRomanticMovies => "Romantic Comedies",
            Genre::CrimeTvShowsDocuseries => "Crime Docuseries",
            Genre::Documentaries => "Documentaries",
            Genre::DocumentariesInternationalMovies => "International Documentaries",
            Genre::Docuseries => "Docuseries",
            Genre::Dramas => "Dramas",
            Genre::DramasInternationalMovies => "International Dramas",
            Genre::DramasRomanticMovies => "Romantic Dramas",
            Genre::FamilyMovies => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::HorrorMovies => "Horror",
            Genre::InternationalMoviesThrillers => "International Thrillers",
            Genre::InternationalTvShowsRomanticTvShowsTvDramas => "Romantic TV Dramas",
            Genre::KidsTv => "Kids' TV",
            Genre::LanguageTvShows => "Language TV Shows",
            Genre::Musicals => "Musicals",
            Genre::NatureTv => "Nature TV",
            Genre::RealityTv => "Reality TV",
            Genre::Spirituality => "Spirituality",
            Genre::TvAction => "TV Action",
            Genre::TvComedies => "TV Comedies",
            Genre::TvDramas => "TV Dramas",
            Genre::TalkShowsTvComedies => "Talk Shows",
            Genre::Thrillers => "Thrillers",
        }
    }

    /// Parse a backend field name
    pub fn from_field(field: &str) -> Option<Genre> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.field_name() == field)
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Genre> for &'static str {
    fn from(genre: Genre) -> Self {
        genre.field_name()
    }
}

impl TryFrom<String> for Genre {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Genre::from_field(&value).ok_or_else(|| format!("unknown genre field: {}", value))
    }
}
