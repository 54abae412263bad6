//! Chart-ready views of repository metadata.

use crate::github::{Contributor, RepositoryMetadata};
use serde::Serialize;

/// Contributors shown in the contributor chart by default
pub const DEFAULT_TOP_CONTRIBUTORS: usize = 10;

/// Stars and forks, shown side by side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popularity {
    /// Stargazer count
    pub stars: u64,
    /// Fork count
    pub forks: u64,
}

/// One slice of the language chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    /// Language name as reported by GitHub
    pub name: String,
    /// Bytes of code in this language
    pub bytes: u64,
    /// Share of all language bytes, 0 to 100
    pub percent: f64,
}

/// Data behind the stars/forks, contributor and language charts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Stars and forks
    pub popularity: Popularity,
    /// First contributors in upstream order
    pub top_contributors: Vec<Contributor>,
    /// Sorted by bytes descending, then name
    pub languages: Vec<LanguageShare>,
}

impl ChartData {
    /// Derives chart data, keeping the first `top_n` contributors
    ///
    /// Percentages are 0 when the repository reports no language bytes.
    pub fn from_metadata(metadata: &RepositoryMetadata, top_n: usize) -> Self {
        let total: u64 = metadata.languages.values().sum();
        let mut languages: Vec<LanguageShare> = metadata
            .languages
            .iter()
            .map(|(name, &bytes)| LanguageShare {
                name: name.clone(),
                bytes,
                percent: if total == 0 {
                    0.0
                } else {
                    bytes as f64 * 100.0 / total as f64
                },
            })
            .collect();
        languages.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));

        Self {
            popularity: Popularity {
                stars: metadata.stars,
                forks: metadata.forks,
            },
            top_contributors: metadata.contributors.iter().take(top_n).cloned().collect(),
            languages,
        }
    }

    /// Largest contribution count, used to scale bar charts
    pub fn max_contributions(&self) -> u64 {
        self.top_contributors.iter().map(|c| c.contributions).max().unwrap_or(0)
    }
}
