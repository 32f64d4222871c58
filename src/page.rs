use std::{fs, path::Path};

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::config::{Changefreq, Config, Priority};

/// Resolved metadata for one discovered HTML file.
#[derive(Serialize, Clone, Debug)]
pub struct PageEntry {
    pub filename: String,
    pub title: String,
    pub href: String,
    pub location: String,
    pub lastmod: String,
    pub priority: Priority,
    pub changefreq: Changefreq,
    pub description: String,
    pub icon: String,
    pub category: String,
}

impl PageEntry {
    /// Never fails for a missing table entry; unknown files take the
    /// default record.
    pub fn resolve(config: &Config, filename: &str, lastmod: String) -> anyhow::Result<Self> {
        let page = config.page_config(filename);

        Ok(Self {
            filename: filename.to_string(),
            title: display_title(config, filename),
            href: filename.to_string(),
            location: config.location(filename)?.into(),
            lastmod,
            priority: page.priority,
            changefreq: page.changefreq,
            description: page.description.clone(),
            icon: page.icon.clone(),
            category: page.category.clone(),
        })
    }
}

pub fn display_title(config: &Config, filename: &str) -> String {
    if let Some(title) = config.titles.get(filename) {
        return title.clone();
    }

    title_case(&filename.replace(".html", "").replace('-', " "))
}

fn title_case(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut after_letter = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if after_letter {
                output.extend(c.to_lowercase());
            } else {
                output.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            output.push(c);
            after_letter = false;
        }
    }

    output
}

/// Modification date of `path` as `YYYY-MM-DD`, or `today` when the
/// filesystem cannot tell us.
pub fn last_modified(path: &Path, today: NaiveDate) -> String {
    let modified = fs::metadata(path).and_then(|m| m.modified());

    let date = match modified {
        Ok(time) => DateTime::<Local>::from(time).date_naive(),
        Err(err) => {
            tracing::warn!("no modification time for {}: {err}", path.display());
            today
        }
    };

    date.format("%Y-%m-%d").to_string()
}
