//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_cookie_arg, Config};
use crate::error::Result;

/// VK document and media attachment downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "vk-doc-downloader",
    version,
    about = "Download VK document and media attachments",
    long_about = "Downloads images, audio and documents referenced by VK links.\n\n\
                  Document viewer pages are resolved to the file they wrap before downloading.\n\
                  Files are sorted into <directory>/<type>/<subtype>/."
)]
pub struct Args {
    /// URLs to download.
    pub urls: Vec<String>,

    /// File with one target per line: `URL [file_name]`.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Maximum number of simultaneous downloads.
    #[arg(short = 'n', long, env = "VK_DOC_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Cookie forwarded to document viewer pages (key=value, repeatable).
    #[arg(long = "cookie", value_name = "KEY=VALUE")]
    pub cookies: Vec<String>,

    /// Write a JSON report of all results to this path.
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) -> Result<()> {
        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(concurrency) = self.concurrency {
            config.options.concurrency = concurrency;
        }

        for cookie in &self.cookies {
            let (key, value) = parse_cookie_arg(cookie)?;
            config.cookies.insert(key, value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "vk-doc-downloader",
            "https://vk.com/doc1_2",
            "https://vk.com/doc3_4",
            "-d",
            "/tmp/out",
            "-n",
            "4",
            "--cookie",
            "remixsid=abc",
            "--quiet",
        ])
        .unwrap();

        assert_eq!(args.urls.len(), 2);
        assert!(args.quiet);
        assert_eq!(args.config, PathBuf::from("config.toml"));

        let mut config = Config::default();
        args.merge_into_config(&mut config).unwrap();
        assert_eq!(config.options.concurrency, 4);
        assert_eq!(config.download_directory(), PathBuf::from("/tmp/out"));
        assert_eq!(config.cookies.get("remixsid").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_bad_cookie_rejected() {
        let args =
            Args::try_parse_from(["vk-doc-downloader", "--cookie", "broken"]).unwrap();
        assert!(args.merge_into_config(&mut Config::default()).is_err());
    }
}
