use crate::FlagClient;
use crate::binding::gate_or_default;
use crate::client::enabled_in;

/// A page section that can be switched off without a deploy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    HeroPostSlider,
    NewsTicker,
    LatestNews,
    MatchCarousel,
    Stats,
    Standings,
    Sponsors,
    RegistrationCta,
    MatchEditor,
    MatchEvents,
    MatchPlayers,
    TeamSelection,
}

impl Section {
    /// Homepage sections, top to bottom.
    pub const HOMEPAGE: &'static [Section] = &[
        Section::HeroPostSlider,
        Section::NewsTicker,
        Section::MatchCarousel,
        Section::LatestNews,
        Section::Stats,
        Section::Standings,
        Section::RegistrationCta,
        Section::Sponsors,
    ];

    /// Panels of the match admin screen.
    pub const MATCH_ADMIN: &'static [Section] = &[
        Section::MatchEditor,
        Section::MatchEvents,
        Section::MatchPlayers,
        Section::TeamSelection,
    ];

    pub fn feature_key(self) -> &'static str {
        match self {
            Section::HeroPostSlider => "home.postSlider",
            Section::NewsTicker => "home.newsTicker",
            Section::LatestNews => "home.latestNews",
            Section::MatchCarousel => "home.matchCarousel",
            Section::Stats => "home.stats",
            Section::Standings => "home.standings",
            Section::Sponsors => "home.sponsors",
            Section::RegistrationCta => "home.registrationCta",
            Section::MatchEditor => "cms.matches",
            Section::MatchEvents => "cms.matchEvents",
            Section::MatchPlayers => "cms.matchPlayers",
            Section::TeamSelection => "cms.teamSelection",
        }
    }

    /// Render `section` through the cached flag state; hidden sections
    /// render as `R::default()`.
    pub fn render<R: Default>(self, client: &FlagClient, section: impl FnOnce() -> R) -> R {
        gate_or_default(client.is_enabled_now(self.feature_key()), section)
    }
}

/// The sections of `layout` that are switched on, waiting for the flags if
/// they have not been fetched yet.
pub async fn visible_sections(client: &FlagClient, layout: &[Section]) -> Vec<Section> {
    let flags = client.get_all().await;

    layout
        .iter()
        .copied()
        .filter(|section| enabled_in(Some(flags.as_ref()), section.feature_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[test]
    fn every_section_names_a_known_key() {
        let registry = Registry::elevate_ballers();

        for section in Section::HOMEPAGE.iter().chain(Section::MATCH_ADMIN) {
            assert!(
                registry.contains(section.feature_key()),
                "{section:?} uses unknown key {}",
                section.feature_key()
            );
        }
    }
}
