use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::pagination::LayoutConstraints;

pub const DEFAULT_MARGIN_X: u16 = 2;
pub const DEFAULT_MARGIN_Y: u16 = 0;
pub const DEFAULT_LINE_HEIGHT: u16 = 1;

/// Flags that may come from the command line or a defaults file.
///
/// Numeric options are `None` when unset so that file and CLI values can
/// be layered with [`ConfigFlags::union`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_progress: bool,
    pub perf: bool,
    pub margin: Option<u16>,
    pub margin_y: Option<u16>,
    pub line_height: Option<u16>,
    pub cache_radius: Option<usize>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_progress: self.no_progress || other.no_progress,
            perf: self.perf || other.perf,
            margin: other.margin.or(self.margin),
            margin_y: other.margin_y.or(self.margin_y),
            line_height: other.line_height.or(self.line_height),
            cache_radius: other.cache_radius.or(self.cache_radius),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    /// Page layout for a `width` x `height` page area.
    pub fn layout(&self, width: u16, height: u16) -> LayoutConstraints {
        LayoutConstraints::new(width, height)
            .with_margins(
                self.margin.unwrap_or(DEFAULT_MARGIN_X),
                self.margin_y.unwrap_or(DEFAULT_MARGIN_Y),
            )
            .with_line_height(self.line_height.unwrap_or(DEFAULT_LINE_HEIGHT))
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("folio").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("folio")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("folio").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("folio").join("config");
        }
    }

    PathBuf::from(".foliorc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".foliorc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# folio defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_progress {
        lines.push("--no-progress".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(margin) = flags.margin {
        lines.push(format!("--margin {margin}"));
    }
    if let Some(margin_y) = flags.margin_y {
        lines.push(format!("--margin-y {margin_y}"));
    }
    if let Some(line_height) = flags.line_height {
        lines.push(format!("--line-height {line_height}"));
    }
    if let Some(radius) = flags.cache_radius {
        lines.push(format!("--cache-radius {radius}"));
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from raw tokens, ignoring everything else.
///
/// Options accept both `--flag value` and `--flag=value`.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline_value.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--watch" => flags.watch = true,
            "--no-progress" => flags.no_progress = true,
            "--perf" => flags.perf = true,
            "--margin" => flags.margin = value().and_then(|v| v.parse().ok()),
            "--margin-y" => flags.margin_y = value().and_then(|v| v.parse().ok()),
            "--line-height" => flags.line_height = value().and_then(|v| v.parse().ok()),
            "--cache-radius" => flags.cache_radius = value().and_then(|v| v.parse().ok()),
            "--render-debug-log" => flags.render_debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}
