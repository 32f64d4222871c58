use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use clap::Parser;
use config::Config;
use render::Rendered;
use site::Site;
use tracing_subscriber::EnvFilter;
use url::Url;

mod category;
mod config;
mod functions;
mod page;
mod render;
mod site;

#[derive(Parser, Debug)]
#[command(name = "Kitchener-Waterloo Wizards Sitemap Generator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the site's HTML files
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Replace the configured base url
    #[arg(long)]
    base_url: Option<Url>,
}

/// One run over one site directory. Concurrent runs against the same
/// directory are last-writer-wins.
pub struct Context {
    home: PathBuf,
    config: Config,
}

impl Context {
    pub fn new(home: PathBuf, base_url: Option<Url>) -> anyhow::Result<Self> {
        let mut config = Config::load(&home)?;

        if let Some(base_url) = base_url {
            config.set_base_url(base_url);
        }

        Ok(Self::with_config(home, config))
    }

    pub fn with_config(home: PathBuf, config: Config) -> Self {
        Self { home, config }
    }

    fn absolute<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.home.join(path.as_ref())
    }

    /// Replaces `path` in one step: the contents go to a temporary file in
    /// the same directory which is then renamed over the target. The target
    /// keeps its permissions; a new file gets the umask default.
    fn write_to_output(&self, path: &str, contents: &str) -> anyhow::Result<()> {
        let output = self.absolute(path);

        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }

        let mut file = builder
            .tempfile_in(&self.home)
            .with_context(|| format!("creating temporary file for {}", output.display()))?;

        if let Ok(existing) = fs::metadata(&output) {
            file.as_file()
                .set_permissions(existing.permissions())
                .with_context(|| format!("copying permissions of {}", output.display()))?;
        }

        file.write_all(contents.as_bytes())?;
        file.persist(&output)
            .with_context(|| format!("writing {}", output.display()))?;

        Ok(())
    }

    fn write_outputs(&self, rendered: &Rendered) -> anyhow::Result<()> {
        self.write_to_output(&self.config.xml_output, &rendered.xml)?;
        self.write_to_output(&self.config.html_output, &rendered.html)?;
        Ok(())
    }
}

/// Renders both sitemaps in memory and only then writes them, so a failure
/// while rendering leaves the previous files untouched.
fn generate(context: &Context, now: DateTime<Local>) -> anyhow::Result<Site> {
    let tera = render::setup_template_engine(context)?;

    println!("🔄 Scanning {}...", context.home.display());
    let site = Site::scan(context, now.date_naive())?;

    println!("🔄 Generating XML and HTML sitemaps...");
    let rendered = render::render(context, &tera, &site, now)?;

    context.write_outputs(&rendered)?;

    println!(
        "✅ XML sitemap generated with {} pages",
        site.pages.len()
    );
    println!(
        "✅ HTML sitemap generated with {} pages in {} categories",
        site.pages.len(),
        rendered.categories
    );

    Ok(site)
}

fn completion_report(context: &Context, site: &Site) -> anyhow::Result<String> {
    let config = &context.config;
    let pages = site.pages.len();

    Ok(format!(
        "
✨ Sitemap generation completed successfully!
📁 Files generated:
   • {xml} ({pages} pages)
   • {html} (user-friendly version)

🔗 Next steps:
   1. Upload these files to your website root directory
   2. Submit {xml} to Google Search Console
   3. Link to {html} from your main navigation if desired

🌐 Sitemap URL: {url}",
        xml = config.xml_output,
        html = config.html_output,
        url = config.location(&config.xml_output)?,
    ))
}

fn run(args: Args) -> anyhow::Result<()> {
    let context = Context::new(args.path, args.base_url)?;

    let site = generate(&context, Local::now())?;

    println!("{}", completion_report(&context, &site)?);

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("🏀 Kitchener-Waterloo Wizards Basketball Association");
    println!("🗺️  Sitemap Generator");
    println!("{}", "=".repeat(50));

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("❌ Error generating sitemaps: {err:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 4, 9, 30, 0).unwrap()
    }

    #[test]
    fn writes_both_sitemaps() {
        let dir = tempdir().unwrap();
        for name in ["index.html", "about.html", "sitemap.html"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let context = Context::new(dir.path().into(), None).unwrap();
        let site = generate(&context, now()).unwrap();

        assert_eq!(site.pages.len(), 2);
        let xml = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        let html = fs::read_to_string(dir.path().join("sitemap.html")).unwrap();
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(html.contains("Total Pages: 2"));
        assert!(!html.contains("<strong>Site Map</strong>"));
    }

    #[test]
    fn rerun_ignores_its_own_output() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        let context = Context::new(dir.path().into(), None).unwrap();
        generate(&context, now()).unwrap();
        let first = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        generate(&context, now()).unwrap();
        let second = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn base_url_override_applies_to_locations() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        fs::write(dir.path().join("about.html"), "").unwrap();

        let base_url = Url::parse("http://127.0.0.1:1111").unwrap();
        let context = Context::new(dir.path().into(), Some(base_url)).unwrap();
        generate(&context, now()).unwrap();

        let xml = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>http://127.0.0.1:1111/</loc>"));
        assert!(xml.contains("<loc>http://127.0.0.1:1111/about.html</loc>"));
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        let xml = dir.path().join("sitemap.xml");
        let html = dir.path().join("sitemap.html");
        fs::write(&xml, "old").unwrap();
        fs::write(&html, "old").unwrap();
        fs::set_permissions(&xml, fs::Permissions::from_mode(0o644)).unwrap();
        fs::set_permissions(&html, fs::Permissions::from_mode(0o640)).unwrap();

        let context = Context::new(dir.path().into(), None).unwrap();
        generate(&context, now()).unwrap();

        assert_eq!(mode(&xml), 0o644);
        assert_eq!(mode(&html), 0o640);
        assert_ne!(fs::read_to_string(&xml).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn new_outputs_follow_the_umask() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        let reference = dir.path().join("reference.txt");
        fs::File::create(&reference).unwrap();

        let context = Context::new(dir.path().into(), None).unwrap();
        generate(&context, now()).unwrap();

        assert_eq!(mode(&dir.path().join("sitemap.xml")), mode(&reference));
        assert_eq!(mode(&dir.path().join("sitemap.html")), mode(&reference));
    }

    #[test]
    fn render_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(
            dir.path().join("templates").join("sitemap.html"),
            "{{ missing_variable }}",
        )
        .unwrap();

        let context = Context::new(dir.path().into(), None).unwrap();

        assert!(generate(&context, now()).is_err());
        assert!(!dir.path().join("sitemap.xml").exists());
        assert!(!dir.path().join("sitemap.html").exists());
    }

    #[test]
    fn completion_report_lists_next_steps() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        let context = Context::new(dir.path().into(), None).unwrap();
        let site = generate(&context, now()).unwrap();
        let report = completion_report(&context, &site).unwrap();

        assert!(report.contains("• sitemap.xml (1 pages)"));
        assert!(report.contains("🔗 Next steps:"));
        assert!(report.contains("2. Submit sitemap.xml to Google Search Console"));
        assert!(report.contains("3. Link to sitemap.html from your main navigation"));
        assert!(report.ends_with("🌐 Sitemap URL: https://kitchener-waterloo-wizards.com/sitemap.xml"));
    }

    #[test]
    fn broken_config_fails_the_run() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(config::CONFIG_FILE), "base_url = 12").unwrap();

        let args = Args {
            path: dir.path().into(),
            base_url: None,
        };

        assert!(run(args).is_err());
    }
}
