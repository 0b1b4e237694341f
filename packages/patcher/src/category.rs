use crate::PatchError;
use retouch_overrides::ContentSnapshot;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Collection-shaped content category and the declaration it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Hero,
    Leaderboard,
    Events,
    Courses,
    Mentors,
    Opportunities,
    Articles,
    FooterLinks,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Hero,
        Category::Leaderboard,
        Category::Events,
        Category::Courses,
        Category::Mentors,
        Category::Opportunities,
        Category::Articles,
        Category::FooterLinks,
    ];

    /// Variable name of the declaration holding this category's literal
    pub fn marker(self) -> &'static str {
        match self {
            Category::Hero => "heroContent",
            Category::Leaderboard => "leaderboardData",
            Category::Events => "events",
            Category::Courses => "courses",
            Category::Mentors => "mentors",
            Category::Opportunities => "opportunities",
            Category::Articles => "articles",
            Category::FooterLinks => "footerLinks",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Hero => "hero",
            Category::Leaderboard => "leaderboard",
            Category::Events => "events",
            Category::Courses => "courses",
            Category::Mentors => "mentors",
            Category::Opportunities => "opportunities",
            Category::Articles => "articles",
            Category::FooterLinks => "footer links",
        }
    }

    /// Snapshot value for this category, `None` when the snapshot lacks it
    pub fn value(self, snapshot: &ContentSnapshot) -> Result<Option<Value>, PatchError> {
        match self {
            Category::Hero => to_value(&snapshot.hero),
            Category::Leaderboard => to_value(&snapshot.leaderboard),
            Category::Events => to_value(&snapshot.events),
            Category::Courses => to_value(&snapshot.courses),
            Category::Mentors => to_value(&snapshot.mentors),
            Category::Opportunities => to_value(&snapshot.opportunities),
            Category::Articles => to_value(&snapshot.articles),
            Category::FooterLinks => to_value(&snapshot.footer_links),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn to_value<T: Serialize>(item: &Option<T>) -> Result<Option<Value>, PatchError> {
    item.as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(PatchError::from)
}
