pub mod get_url;
