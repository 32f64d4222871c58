use chrono::{DateTime, Local};
use tera::Tera;

use crate::{
    category,
    functions::get_url::GetURL,
    site::Site,
    Context,
};

pub const XML_TEMPLATE: &str = "sitemap.xml";
pub const HTML_TEMPLATE: &str = "sitemap.html";

const BUILTIN_TEMPLATES: [(&str, &str); 2] = [
    (XML_TEMPLATE, include_str!("../templates/sitemap.xml")),
    (HTML_TEMPLATE, include_str!("../templates/sitemap.html")),
];

/// Both sitemap documents, rendered but not yet written.
pub struct Rendered {
    pub xml: String,
    pub html: String,
    pub categories: usize,
}

/// Built-in templates, overridden by same-named files in the site's
/// `templates/` directory.
pub fn setup_template_engine(context: &Context) -> anyhow::Result<Tera> {
    let template_dir = context.absolute("templates");

    let mut tera = if template_dir.is_dir() {
        Tera::new(&template_dir.join("**").join("*").to_string_lossy())?
    } else {
        Tera::default()
    };

    let overridden = tera
        .get_template_names()
        .map(String::from)
        .collect::<Vec<_>>();

    for (name, body) in BUILTIN_TEMPLATES {
        if overridden.iter().any(|n| n == name) {
            println!("using template override {name}");
            continue;
        }
        tera.add_raw_template(name, body)?;
    }

    tera.autoescape_on(vec![".html"]);
    tera.register_function("get_url", GetURL::new(context.config.base_url.clone()));

    Ok(tera)
}

pub fn render(
    context: &Context,
    tera: &Tera,
    site: &Site,
    generated: DateTime<Local>,
) -> anyhow::Result<Rendered> {
    let mut ctx = tera::Context::new();
    ctx.insert("config", &context.config);
    ctx.insert("pages", &site.pages);

    let xml = tera.render(XML_TEMPLATE, &ctx)?;

    let categories = category::group(site, &context.config);

    ctx.insert("categories", &categories);
    ctx.insert("page_count", &site.pages.len());
    ctx.insert(
        "generated",
        &generated.format("%B %d, %Y at %I:%M %p").to_string(),
    );

    let html = tera.render(HTML_TEMPLATE, &ctx)?;

    Ok(Rendered {
        xml,
        html,
        categories: categories.len(),
    })
}
