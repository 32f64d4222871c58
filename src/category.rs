use serde::Serialize;

use crate::{config::Config, page::PageEntry, site::Site};

#[derive(Serialize, Debug)]
pub struct Category {
    pub name: String,
    pub icon: String,
    pub pages: Vec<PageEntry>,
}

/// Groups pages for the HTML sitemap. Configured categories come first in
/// their configured order; any other category follows in order of first
/// appearance. Pages inside a category are ordered by descending priority,
/// ties keeping discovery order.
pub fn group(site: &Site, config: &Config) -> Vec<Category> {
    let mut categories = config
        .categories
        .iter()
        .map(|c| Category {
            name: c.name.clone(),
            icon: c.icon.clone(),
            pages: vec![],
        })
        .collect::<Vec<_>>();

    for page in &site.pages {
        let index = match categories.iter().position(|c| c.name == page.category) {
            Some(index) => index,
            None => {
                categories.push(Category {
                    name: page.category.clone(),
                    icon: config.unlisted_category_icon.clone(),
                    pages: vec![],
                });
                categories.len() - 1
            }
        };

        categories[index].pages.push(page.clone());
    }

    categories.retain(|c| !c.pages.is_empty());

    for category in &mut categories {
        category
            .pages
            .sort_by(|a, b| b.priority.value().total_cmp(&a.priority.value()));
    }

    categories
}
