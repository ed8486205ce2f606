use clap::Parser;
use material_preview::PreviewConfig;
use std::path::PathBuf;

/// Preview the attachments of one material from the materials library.
#[derive(Debug, Parser)]
#[command(name = "material-preview", version)]
pub struct Cli {
    /// Material whose files are listed.
    #[arg(long, short)]
    pub material: i64,

    #[arg(long, default_value = "conf/preview.toml")]
    pub config: PathBuf,

    /// Overrides `base_url` from the config file.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Overrides `access_token` from the config file.
    #[arg(long)]
    pub access_token: Option<String>,

    /// Where downloaded files are written.
    #[arg(long, default_value = ".")]
    pub download_dir: PathBuf,

    /// Walk every preview without opening a window.
    #[arg(long)]
    pub headless: bool,

    /// Only preview this file index (headless mode).
    #[arg(long, requires = "headless")]
    pub file: Option<usize>,

    /// Write rendered PDF pages as PNG files here (headless mode).
    #[arg(long, requires = "headless")]
    pub dump_dir: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, config: &mut PreviewConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(token) = &self.access_token {
            config.access_token = Some(token.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "material-preview",
            "--material",
            "12",
            "--base-url",
            "https://materials.example.edu",
            "--access-token",
            "t0k",
        ])
        .unwrap();
        let mut config = PreviewConfig::default();
        cli.apply(&mut config);
        assert_eq!(cli.material, 12);
        assert_eq!(config.base_url, "https://materials.example.edu");
        assert_eq!(config.access_token.as_deref(), Some("t0k"));
        assert_eq!(cli.config, PathBuf::from("conf/preview.toml"));
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["material-preview", "-m", "3"]).unwrap();
        let mut config = PreviewConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, PreviewConfig::default());
        assert!(!cli.headless);
    }

    #[test]
    fn dump_dir_needs_headless() {
        assert!(Cli::try_parse_from(["material-preview", "-m", "3", "--dump-dir", "out"]).is_err());
        let cli = Cli::try_parse_from([
            "material-preview",
            "-m",
            "3",
            "--headless",
            "--file",
            "1",
            "--dump-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(1));
        assert_eq!(cli.dump_dir, Some(PathBuf::from("out")));
    }
}
