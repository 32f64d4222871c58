use anyhow::Context as _;
use chrono::NaiveDate;
use walkdir::WalkDir;

use crate::{
    page::{last_modified, PageEntry},
    Context,
};

/// Every HTML page of the site, in canonical (filename) order.
pub struct Site {
    pub pages: Vec<PageEntry>,
}

impl Site {
    pub fn scan(context: &Context, today: NaiveDate) -> anyhow::Result<Self> {
        let mut filenames = vec![];

        for entry in WalkDir::new(&context.home).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("listing {}", context.home.display()))?;

            // follows symlinks; broken ones are skipped
            if !entry.path().is_file() {
                continue;
            }

            if !entry.path().extension().is_some_and(|e| e == "html") {
                continue;
            }

            let Some(filename) = entry.file_name().to_str() else {
                tracing::warn!("skipping non utf-8 filename {:?}", entry.file_name());
                continue;
            };

            if filename.starts_with('.') {
                tracing::debug!("skipping hidden {filename}");
                continue;
            }

            if context.config.is_excluded(filename) {
                tracing::debug!("excluding {filename}");
                continue;
            }

            filenames.push(filename.to_string());
        }

        filenames.sort();

        let pages = filenames
            .iter()
            .map(|filename| {
                tracing::debug!("found {filename}");
                let lastmod = last_modified(&context.absolute(filename), today);
                PageEntry::resolve(&context.config, filename, lastmod)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self { pages })
    }
}
