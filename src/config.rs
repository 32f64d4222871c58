use std::{
    collections::{BTreeMap, BTreeSet},
    fmt, fs,
    path::Path,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

pub const CONFIG_FILE: &str = "sitemap.toml";

const DOMAIN: &str = "https://kitchener-waterloo-wizards.com";

/// Sitemap-protocol update cadence hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Changefreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for Changefreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Changefreq::Always => "always",
            Changefreq::Hourly => "hourly",
            Changefreq::Daily => "daily",
            Changefreq::Weekly => "weekly",
            Changefreq::Monthly => "monthly",
            Changefreq::Yearly => "yearly",
            Changefreq::Never => "never",
        };
        f.write_str(s)
    }
}

/// Page priority, always within `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "RawPriority")]
pub struct Priority(f64);

/// Priorities are written as numbers in `sitemap.toml` but serialize as
/// text, so both forms are read back.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPriority {
    Number(f64),
    Text(String),
}

impl Priority {
    pub fn new(value: f64) -> anyhow::Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(anyhow::anyhow!("priority {value} is outside 0.0..=1.0"))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<RawPriority> for Priority {
    type Error = String;

    fn try_from(raw: RawPriority) -> Result<Self, Self::Error> {
        let value = match raw {
            RawPriority::Number(value) => value,
            RawPriority::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("priority {text:?}: {e}"))?,
        };
        Priority::new(value).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PageConfig {
    pub priority: Priority,
    pub changefreq: Changefreq,
    pub description: String,
    pub icon: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CategoryConfig {
    pub name: String,
    pub icon: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub base_url: Url,
    pub homepage: String,
    pub xml_output: String,
    pub html_output: String,
    pub pages: BTreeMap<String, PageConfig>,
    pub default_page: PageConfig,
    pub exclude: BTreeSet<String>,
    /// Display order of the HTML sitemap sections.
    pub categories: Vec<CategoryConfig>,
    pub unlisted_category_icon: String,
    pub titles: BTreeMap<String, String>,
}

fn page(
    priority: f64,
    changefreq: Changefreq,
    description: &str,
    icon: &str,
    category: &str,
) -> PageConfig {
    PageConfig {
        priority: Priority(priority),
        changefreq,
        description: description.to_string(),
        icon: icon.to_string(),
        category: category.to_string(),
    }
}

impl Config {
    /// The Kitchener-Waterloo Wizards table.
    pub fn builtin() -> anyhow::Result<Self> {
        use Changefreq::*;

        #[rustfmt::skip]
        let pages = [
            ("index.html", page(1.0, Weekly, "Welcome to the Wizards - Magic on the Court!", "🏠", "Main Pages")),
            ("about.html", page(0.9, Monthly, "Learn about our basketball association and mission", "ℹ️", "Main Pages")),
            ("registration.html", page(0.9, Weekly, "Sign up for programs and teams", "📝", "Registration & Events")),
            ("rep-teams.html", page(0.8, Monthly, "Competitive basketball teams and tryout information", "🏆", "Programs & Training")),
            ("development.html", page(0.8, Monthly, "Skill development programs for all ages", "📈", "Programs & Training")),
            ("individual-training.html", page(0.7, Monthly, "One-on-one coaching and personal development", "👤", "Programs & Training")),
            ("upcoming-events.html", page(0.6, Weekly, "Games, tournaments, and special events", "📅", "Registration & Events")),
            ("photo-gallery.html", page(0.5, Monthly, "Photos from games, events, and team activities", "📷", "Media")),
            ("u11-rep-tryouts-flyer.html", page(0.4, Yearly, "Information about U11 rep team tryouts", "🔥", "Registration & Events")),
            ("sitemap.html", page(0.3, Monthly, "Complete site navigation and page directory", "🗺️", "Navigation")),
        ];

        let titles = [
            ("index.html", "Homepage"),
            ("about.html", "About Us"),
            ("registration.html", "Registration"),
            ("rep-teams.html", "Rep Teams"),
            ("development.html", "Development Program"),
            ("individual-training.html", "Individual Training"),
            ("upcoming-events.html", "Upcoming Events"),
            ("photo-gallery.html", "Photo Gallery"),
            ("u11-rep-tryouts-flyer.html", "U11 Rep Tryouts"),
            ("sitemap.html", "Site Map"),
        ];

        let categories = [
            ("Main Pages", "🏠"),
            ("Programs & Training", "🏀"),
            ("Registration & Events", "📝"),
            ("Media", "📸"),
            ("Navigation", "🗺️"),
            ("Other Pages", "📄"),
        ];

        let exclude = [
            "sitemap.html",
            "index-mobile-optimized.html",
            "index-smooth-mobile.html",
            "index-ultra-mobile.html",
        ];

        Ok(Self {
            base_url: Url::parse(DOMAIN)?,
            homepage: "index.html".to_string(),
            xml_output: "sitemap.xml".to_string(),
            html_output: "sitemap.html".to_string(),
            pages: pages
                .into_iter()
                .map(|(name, config)| (name.to_string(), config))
                .collect(),
            default_page: page(0.5, Monthly, "Basketball association page", "🏀", "Other Pages"),
            exclude: exclude.into_iter().map(String::from).collect(),
            categories: categories
                .into_iter()
                .map(|(name, icon)| CategoryConfig {
                    name: name.to_string(),
                    icon: icon.to_string(),
                })
                .collect(),
            unlisted_category_icon: "📄".to_string(),
            titles: titles
                .into_iter()
                .map(|(name, title)| (name.to_string(), title.to_string()))
                .collect(),
        })
    }

    /// Loads `sitemap.toml` from `home` over the built-in table. Each
    /// top-level key in the file replaces the built-in value whole.
    pub fn load(home: &Path) -> anyhow::Result<Self> {
        let config_file = home.join(CONFIG_FILE);

        let mut config = Config::builtin()?;

        if config_file.is_file() {
            let config_text = fs::read_to_string(&config_file)
                .with_context(|| format!("reading {}", config_file.display()))?;
            let overrides = toml::from_str::<toml::Table>(&config_text)
                .with_context(|| format!("parsing {}", config_file.display()))?;

            let toml::Value::Table(mut merged) = toml::Value::try_from(&config)? else {
                anyhow::bail!("built-in configuration is not a table");
            };
            merged.extend(overrides);

            config = toml::Value::Table(merged)
                .try_into::<Config>()
                .with_context(|| format!("parsing {}", config_file.display()))?;
        }

        config.base_url = as_directory(config.base_url);

        Ok(config)
    }

    pub fn set_base_url(&mut self, base_url: Url) {
        self.base_url = as_directory(base_url);
    }

    pub fn page_config(&self, filename: &str) -> &PageConfig {
        self.pages.get(filename).unwrap_or(&self.default_page)
    }

    /// Files that must never appear in either sitemap.
    pub fn is_excluded(&self, filename: &str) -> bool {
        self.exclude.contains(filename) || filename == self.xml_output || filename == self.html_output
    }

    /// Absolute URL of a page. The homepage maps to the bare site root.
    pub fn location(&self, filename: &str) -> anyhow::Result<Url> {
        if filename == self.homepage {
            return Ok(self.base_url.clone());
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base url {} cannot hold a path", self.base_url))?
            .pop_if_empty()
            .push(filename);

        Ok(url)
    }
}

fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
