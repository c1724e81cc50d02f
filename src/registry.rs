use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Grouping for the descriptor table. Purely organisational: the leading
/// segment of a key is not checked against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Homepage,
    Module,
    Cms,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    pub key: String,
    pub default_enabled: bool,
    pub description: String,
    pub category: Category,
}

impl FeatureDescriptor {
    pub fn new(
        key: impl Into<String>,
        default_enabled: bool,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            key: key.into(),
            default_enabled,
            description: description.into(),
            category,
        }
    }

    /// `home.postSlider` -> `FEATURE_FLAG_HOME_POSTSLIDER`
    pub fn env_var_name(&self) -> String {
        env_var_name(&self.key)
    }
}

pub(crate) const ENV_VAR_PREFIX: &str = "FEATURE_FLAG_";

pub fn env_var_name(key: &str) -> String {
    format!("{ENV_VAR_PREFIX}{}", key.to_uppercase().replace('.', "_"))
}

/// The set of keys that exist, in declaration order.
///
/// Cloning is cheap; the table is shared.
#[derive(Clone, Debug)]
pub struct Registry {
    descriptors: Arc<[FeatureDescriptor]>,
}

impl Registry {
    /// Later duplicates of a key are dropped so every key appears once.
    pub fn new(descriptors: impl IntoIterator<Item = FeatureDescriptor>) -> Self {
        let mut table: Vec<FeatureDescriptor> = Vec::new();

        for descriptor in descriptors {
            if table.iter().any(|d| d.key == descriptor.key) {
                tracing::warn!(
                    key = %descriptor.key,
                    "Duplicate feature key in the descriptor table, ignoring"
                );
                continue;
            }
            table.push(descriptor);
        }

        Self {
            descriptors: table.into(),
        }
    }

    /// The table shipped with the Elevate Ballers site.
    pub fn elevate_ballers() -> Self {
        Self::new(DEFAULT_TABLE.iter().map(|(key, default_enabled, description, category)| {
            FeatureDescriptor::new(*key, *default_enabled, *description, *category)
        }))
    }

    pub fn descriptors(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, key: &str) -> Option<&FeatureDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::elevate_ballers()
    }
}

const DEFAULT_TABLE: &[(&str, bool, &str, Category)] = &[
    ("layout.topBar", true, "Top bar with social links and league contact details", Category::Layout),
    ("layout.mobileMenu", true, "Slide-out navigation on small screens", Category::Layout),
    ("layout.footerWidgets", true, "Footer widget columns (recent posts, partners, contact)", Category::Layout),
    ("layout.searchOverlay", false, "Full-screen search overlay opened from the header", Category::Layout),
    ("home.postSlider", true, "Hero slider of featured posts at the top of the homepage", Category::Homepage),
    ("home.newsTicker", true, "Scrolling ticker of the latest headlines", Category::Homepage),
    ("home.latestNews", true, "Grid of the most recent news articles", Category::Homepage),
    ("home.matchCarousel", true, "Carousel of upcoming and recent matches", Category::Homepage),
    ("home.stats", true, "League leaders and season statistics block", Category::Homepage),
    ("home.standings", false, "League standings table", Category::Homepage),
    ("home.sponsors", true, "Sponsor logo strip", Category::Homepage),
    ("home.registrationCta", true, "Player registration call to action", Category::Homepage),
    ("module.matches", true, "Public match listing and match detail pages", Category::Module),
    ("module.teams", true, "Public team pages and rosters", Category::Module),
    ("module.players", true, "Public player profiles", Category::Module),
    ("module.news", true, "News archive and article pages", Category::Module),
    ("module.gallery", false, "Photo gallery pages", Category::Module),
    ("cms.matches", true, "Match editor in the admin area", Category::Cms),
    ("cms.matchEvents", true, "Match events manager (scores, fouls, substitutions)", Category::Cms),
    ("cms.matchPlayers", true, "Match players manager (lineups and box scores)", Category::Cms),
    ("cms.teamSelection", true, "Team selection for matches", Category::Cms),
    ("cms.news", true, "News post editor", Category::Cms),
    ("cms.seasons", false, "League and season management", Category::Cms),
];
