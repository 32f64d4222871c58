use std::collections::HashMap;
use url::Url;

/// `get_url(path="...")`: absolute URL of a path on the site.
pub struct GetURL {
    base_url: Url,
}

impl GetURL {
    pub fn new(base_url: Url) -> Self {
        GetURL { base_url }
    }
}

impl tera::Function for GetURL {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let path = args
            .get("path")
            .cloned()
            .map(tera::from_value::<String>)
            .transpose()?
            .ok_or("get_url: missing path")?;

        let result = self
            .base_url
            .join(path.trim().trim_start_matches('/'))
            .map_err(|e| format!("get_url: {e}"))?;

        Ok(tera::to_value::<String>(result.into())?)
    }

    fn is_safe(&self) -> bool {
        true
    }
}
